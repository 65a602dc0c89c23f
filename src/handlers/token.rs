//! Token API Handlers
//! Faucet token surface: the combined info read, the one-time claim, and
//! transfers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;

use super::{error_response, ApiError};

// ========================================
// Types
// ========================================

#[derive(Debug, Deserialize)]
pub struct TokenInfoQuery {
    pub address: Option<String>,
}

#[derive(Serialize)]
pub struct TokenInfoResponse {
    pub success: bool,
    pub address: String,
    pub symbol: String,
    pub balance: String,
    pub claimed: bool,
    /// None when the deployed token has no dropAmount().
    pub drop_amount: Option<String>,
    pub faucet_remaining: String,
    pub token_link: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub spender: String,
    /// Raw token units, decimal string.
    pub amount_raw: String,
}

#[derive(Serialize)]
pub struct TxResponse {
    pub success: bool,
    pub tx_hash: String,
    pub tx_link: String,
}

// ========================================
// Handlers
// ========================================

/// GET /api/token/info?address= — independent reads combined into one
/// payload. Every read degrades to a default on failure so one flaky
/// call does not blank the whole section.
pub async fn token_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenInfoQuery>,
) -> Result<Json<TokenInfoResponse>, ApiError> {
    let address = match query.address.filter(|a| !a.is_empty()) {
        Some(address) => address,
        None => state.bridge.current_address().await.map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("wallet unavailable: {}", e))
        })?,
    };

    let symbol = state.token.symbol().await.unwrap_or_else(|e| {
        warn!("symbol read failed: {}", e);
        "TB".to_string()
    });
    let balance = state
        .token
        .balance_formatted(&address)
        .await
        .unwrap_or_else(|e| {
            warn!("balance read failed: {}", e);
            "0".to_string()
        });
    let claimed = state
        .token
        .claimed(&address)
        .await
        .unwrap_or(None)
        .unwrap_or(false);
    let drop_amount = state.token.drop_amount_formatted().await.unwrap_or(None);
    let faucet_remaining = state
        .token
        .faucet_remaining_formatted()
        .await
        .unwrap_or_else(|_| "0".to_string());

    let token_link = format!(
        "{}/token/{}?a={}",
        state.config.explorer_base,
        state.token.address(),
        address
    );

    Ok(Json(TokenInfoResponse {
        success: true,
        address,
        symbol,
        balance,
        claimed,
        drop_amount,
        faucet_remaining,
        token_link,
    }))
}

/// POST /api/token/claim — the one-time grant. The contract owns the
/// one-time guarantee; a repeat claim surfaces as a revert.
pub async fn claim(State(state): State<Arc<AppState>>) -> Result<Json<TxResponse>, ApiError> {
    let receipt = state.token.claim().await.map_err(|e| {
        error_response(StatusCode::BAD_GATEWAY, format!("claim failed: {}", e))
    })?;

    info!("Token claimed: tx={}", receipt.transaction_hash);
    Ok(Json(tx_response(&state, receipt.transaction_hash)))
}

/// POST /api/token/transfer — human-readable amount, converted with
/// freshly fetched decimals. Irreversible once mined.
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let to = req.to.trim();
    let amount = req.amount.trim();
    if to.is_empty() || amount.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "to and amount are required".to_string(),
        ));
    }

    let receipt = state.token.transfer(to, amount).await.map_err(|e| {
        error_response(StatusCode::BAD_GATEWAY, format!("transfer failed: {}", e))
    })?;

    info!("Token transferred: to={} tx={}", to, receipt.transaction_hash);
    Ok(Json(tx_response(&state, receipt.transaction_hash)))
}

/// POST /api/token/approve — allowance grant for a market spender,
/// taken in raw units.
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let spender = req.spender.trim();
    let amount = U256::from_dec_str(req.amount_raw.trim()).map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            "amount_raw must be a decimal integer".to_string(),
        )
    })?;
    if spender.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "spender is required".to_string(),
        ));
    }

    let receipt = state.token.approve(spender, amount).await.map_err(|e| {
        error_response(StatusCode::BAD_GATEWAY, format!("approve failed: {}", e))
    })?;

    info!("Token approved: spender={} tx={}", spender, receipt.transaction_hash);
    Ok(Json(tx_response(&state, receipt.transaction_hash)))
}

fn tx_response(state: &AppState, tx_hash: String) -> TxResponse {
    let tx_link = format!("{}/tx/{}", state.config.explorer_base, tx_hash);
    TxResponse {
        success: true,
        tx_hash,
        tx_link,
    }
}
