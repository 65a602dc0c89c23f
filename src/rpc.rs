//! Ethereum JSON-RPC Client
//! Thin reqwest-based JSON-RPC 2.0 client for the provider endpoint that
//! holds the signing accounts (the server-side stand-in for the injected
//! browser wallet).

use primitive_types::U256;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

use crate::abi::AbiError;

#[derive(Debug, Error)]
pub enum EthError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    #[error("unit conversion error: {0}")]
    Units(#[from] crate::contracts::units::UnitsError),

    #[error("no unlocked account on the provider")]
    NoAccounts,

    #[error("transaction {0} was not mined in time")]
    ReceiptTimeout(String),

    #[error("transaction {0} reverted")]
    TxReverted(String),
}

/// JSON-RPC request
#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

/// JSON-RPC response
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i32,
    message: String,
}

/// One log entry of a transaction receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

/// Transaction receipt, reduced to the fields the flows read.
#[derive(Debug, Clone, Deserialize)]
pub struct Receipt {
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

pub struct EthRpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl EthRpcClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, EthError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id,
        };

        debug!("rpc call: {}", method);
        let response = self.client.post(&self.url).json(&request).send().await?;
        let rpc_response: RpcResponse = response.json().await?;

        if let Some(error) = rpc_response.error {
            return Err(EthError::Rpc(format!("{}: {}", error.code, error.message)));
        }
        Ok(rpc_response.result)
    }

    /// Accounts the provider is willing to sign for.
    pub async fn accounts(&self) -> Result<Vec<String>, EthError> {
        let result = self.call("eth_accounts", json!([])).await?;
        let accounts: Vec<String> =
            serde_json::from_value(result).map_err(|e| EthError::Rpc(e.to_string()))?;
        Ok(accounts)
    }

    /// Read-only contract call; returns the raw return data.
    pub async fn eth_call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, EthError> {
        let params = json!([
            { "to": to, "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ]);
        let result = self.call("eth_call", params).await?;
        let hex_str = result
            .as_str()
            .ok_or_else(|| EthError::Rpc("invalid eth_call response".to_string()))?;
        hex::decode(hex_str.trim_start_matches("0x"))
            .map_err(|e| EthError::Rpc(format!("bad return data: {}", e)))
    }

    /// Submit a transaction signed by the provider; returns the tx hash.
    pub async fn send_transaction(
        &self,
        from: &str,
        to: &str,
        data: &[u8],
        value: Option<U256>,
    ) -> Result<String, EthError> {
        let mut tx = json!({
            "from": from,
            "to": to,
            "data": format!("0x{}", hex::encode(data)),
        });
        if let Some(value) = value {
            tx["value"] = json!(format!("{:#x}", value));
        }

        let result = self.call("eth_sendTransaction", json!([tx])).await?;
        let hash = result
            .as_str()
            .ok_or_else(|| EthError::Rpc("invalid transaction hash response".to_string()))?;
        Ok(hash.to_string())
    }

    pub async fn get_receipt(&self, tx_hash: &str) -> Result<Option<Receipt>, EthError> {
        let result = self.call("eth_getTransactionReceipt", json!([tx_hash])).await?;
        if result.is_null() {
            return Ok(None);
        }
        let receipt: Receipt =
            serde_json::from_value(result).map_err(|e| EthError::Rpc(e.to_string()))?;
        Ok(Some(receipt))
    }

    /// Poll for the receipt until the transaction is mined (the `tx.wait()`
    /// equivalent). A receipt with status 0x0 is a revert.
    pub async fn wait_for_receipt(&self, tx_hash: &str) -> Result<Receipt, EthError> {
        const ATTEMPTS: u32 = 60;
        const INTERVAL: std::time::Duration = std::time::Duration::from_secs(2);

        for _ in 0..ATTEMPTS {
            if let Some(receipt) = self.get_receipt(tx_hash).await? {
                if receipt.status.as_deref() == Some("0x0") {
                    return Err(EthError::TxReverted(tx_hash.to_string()));
                }
                return Ok(receipt);
            }
            tokio::time::sleep(INTERVAL).await;
        }
        Err(EthError::ReceiptTimeout(tx_hash.to_string()))
    }
}
