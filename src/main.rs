use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use nft_market_server::{api_router, config::AppConfig, db, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    if config.pinata_jwt.is_none() {
        warn!("PINATA_JWT not set; uploads will be rejected");
    }
    if config.market_address.is_empty() || config.token_address.is_empty() {
        warn!("MARKET_ADDRESS / TOKEN_ADDRESS not set; contract calls will fail");
    }

    let pool = db::init_db(&config.db_path).await?;
    let addr = format!("0.0.0.0:{}", config.api_port);
    let state = Arc::new(AppState::new(config, pool));
    let app = api_router(state);

    info!("NFT Market API Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
