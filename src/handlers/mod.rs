//! API Handlers

use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use tracing::warn;

pub mod ipfs;
pub mod listings;
pub mod nft;
pub mod token;
pub mod users;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(status: StatusCode, message: String) -> ApiError {
    warn!("API Error: {}", message);
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message,
        }),
    )
}
