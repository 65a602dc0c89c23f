//! Configuration
//! Everything externally supplied lives in environment variables: the
//! pinning credential, the provider endpoint, and the two fixed contract
//! addresses.

use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_port: u16,
    pub db_path: String,
    pub pinata_base_url: String,
    pub pinata_jwt: Option<String>,
    pub eth_rpc_url: String,
    pub market_address: String,
    pub token_address: String,
    pub explorer_base: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let api_port = env::var("MARKET_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(3000);

        Self {
            api_port,
            db_path: env::var("MARKET_DB").unwrap_or_else(|_| "market.db".to_string()),
            pinata_base_url: env::var("PINATA_BASE_URL")
                .unwrap_or_else(|_| "https://api.pinata.cloud".to_string()),
            pinata_jwt: env::var("PINATA_JWT").ok(),
            eth_rpc_url: env::var("ETH_RPC_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8545".to_string()),
            market_address: env::var("MARKET_ADDRESS").unwrap_or_default(),
            token_address: env::var("TOKEN_ADDRESS").unwrap_or_default(),
            explorer_base: env::var("EXPLORER_BASE")
                .unwrap_or_else(|_| "https://sepolia.etherscan.io".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: 3000,
            db_path: "market.db".to_string(),
            pinata_base_url: "https://api.pinata.cloud".to_string(),
            pinata_jwt: None,
            eth_rpc_url: "http://127.0.0.1:8545".to_string(),
            market_address: String::new(),
            token_address: String::new(),
            explorer_base: "https://sepolia.etherscan.io".to_string(),
        }
    }
}
