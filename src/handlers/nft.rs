//! NFT Admin Handlers
//! Direct marketplace-contract operations outside the listing flow:
//! mint, transfer, and tokenURI updates.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::AppState;

use super::{error_response, ApiError};

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub to: String,
    pub metadata_uri: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferNftRequest {
    pub to: String,
    pub token_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTokenUriRequest {
    pub token_id: u64,
    pub metadata_uri: String,
}

#[derive(Serialize)]
pub struct TxResponse {
    pub success: bool,
    pub tx_hash: String,
}

/// POST /api/nft/mint
pub async fn mint(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MintRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let receipt = state
        .market
        .mint(&req.to, &req.metadata_uri)
        .await
        .map_err(chain_error)?;
    info!("NFT minted: to={} tx={}", req.to, receipt.transaction_hash);
    Ok(Json(TxResponse {
        success: true,
        tx_hash: receipt.transaction_hash,
    }))
}

/// POST /api/nft/transfer
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferNftRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let receipt = state
        .market
        .transfer_nft(&req.to, req.token_id)
        .await
        .map_err(chain_error)?;
    info!(
        "NFT transferred: token_id={} to={} tx={}",
        req.token_id, req.to, receipt.transaction_hash
    );
    Ok(Json(TxResponse {
        success: true,
        tx_hash: receipt.transaction_hash,
    }))
}

/// POST /api/nft/token-uri
pub async fn update_token_uri(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateTokenUriRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let receipt = state
        .market
        .update_token_uri(req.token_id, &req.metadata_uri)
        .await
        .map_err(chain_error)?;
    info!(
        "tokenURI updated: token_id={} tx={}",
        req.token_id, receipt.transaction_hash
    );
    Ok(Json(TxResponse {
        success: true,
        tx_hash: receipt.transaction_hash,
    }))
}

fn chain_error(e: crate::rpc::EthError) -> ApiError {
    error_response(StatusCode::BAD_GATEWAY, format!("contract call failed: {}", e))
}
