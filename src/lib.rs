//! NFT marketplace server: listings over a SQLite document store, IPFS
//! pinning for images and metadata, and contract calls through a
//! provider-held wallet account.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;

pub mod abi;
pub mod config;
pub mod contracts;
pub mod db;
pub mod gateway;
pub mod handlers;
pub mod ipfs;
pub mod models;
pub mod rpc;
pub mod search;
pub mod store;
pub mod wallet;

use config::AppConfig;
use contracts::{MarketContract, TokenContract};
use db::DbPool;
use ipfs::PinataClient;
use wallet::WalletBridge;

pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub pinata: PinataClient,
    pub bridge: Arc<WalletBridge>,
    pub market: MarketContract,
    pub token: TokenContract,
    /// Plain client for gateway metadata fetches.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let pinata = PinataClient::new(&config.pinata_base_url, config.pinata_jwt.clone());
        let bridge = Arc::new(WalletBridge::new(&config.eth_rpc_url));
        let market = MarketContract::new(bridge.clone(), &config.market_address);
        let token = TokenContract::new(bridge.clone(), &config.token_address);
        Self {
            config,
            db,
            pinata,
            bridge,
            market,
            token,
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: "nft-market-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Full API router. Separated from main so the integration tests can
/// mount it on an ephemeral port.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/ipfs", post(handlers::ipfs::upload))
        .route(
            "/api/listings",
            get(handlers::listings::list_listings).post(handlers::listings::create_listing),
        )
        .route(
            "/api/listings/:listing_id",
            get(handlers::listings::get_listing)
                .put(handlers::listings::update_listing)
                .delete(handlers::listings::delete_listing),
        )
        .route(
            "/api/listings/:listing_id/purchase",
            post(handlers::listings::purchase_listing),
        )
        .route(
            "/api/users/:uid/profile",
            put(handlers::users::update_profile).get(handlers::users::get_profile),
        )
        .route(
            "/api/users/:uid/cart",
            get(handlers::users::list_cart).post(handlers::users::add_to_cart),
        )
        .route(
            "/api/users/:uid/cart/:listing_id",
            axum::routing::delete(handlers::users::remove_from_cart),
        )
        .route("/api/users/:uid/likes", get(handlers::users::list_likes))
        .route(
            "/api/users/:uid/likes/toggle",
            post(handlers::users::toggle_like),
        )
        .route(
            "/api/users/:uid/purchases",
            get(handlers::users::list_purchases),
        )
        .route(
            "/api/users/:uid/listings",
            get(handlers::users::list_my_listings),
        )
        .route("/api/users/:uid/nfts", get(handlers::users::list_owned_nfts))
        .route("/api/token/info", get(handlers::token::token_info))
        .route("/api/token/claim", post(handlers::token::claim))
        .route("/api/token/transfer", post(handlers::token::transfer))
        .route("/api/token/approve", post(handlers::token::approve))
        .route("/api/nft/mint", post(handlers::nft::mint))
        .route("/api/nft/transfer", post(handlers::nft::transfer))
        .route("/api/nft/token-uri", post(handlers::nft::update_token_uri))
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024)) // 50MB uploads
        .layer(CorsLayer::permissive())
        .with_state(state)
}
