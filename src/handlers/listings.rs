//! Listings API Handlers
//! /api/listings endpoints: the visible index, detail with owner nickname,
//! owner-gated create/edit/delete, and the purchase settlement flow.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::gateway::to_gateway;
use crate::models::{
    ListingDetail, ListingSummary, PurchaseRequest, UpdateListingRequest, parse_price,
};
use crate::search::filter_by_query;
use crate::store;
use crate::AppState;

use super::ipfs::{parse_upload_form, pin_error_response, pin_listing_assets};
use super::{error_response, ApiError};

// ========================================
// Response types
// ========================================

#[derive(Serialize)]
pub struct ListingDetailResponse {
    pub success: bool,
    pub listing: ListingDetail,
}

#[derive(Serialize)]
pub struct ListingCreateResponse {
    pub success: bool,
    pub listing_id: String,
    #[serde(rename = "imageURI")]
    pub image_uri: String,
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
}

#[derive(Serialize)]
pub struct ListingMutationResponse {
    pub success: bool,
    pub listing_id: String,
}

#[derive(Serialize)]
pub struct PurchaseResponse {
    pub success: bool,
    pub listing_id: String,
    pub token_id: u64,
    pub tx_hash: String,
}

// ========================================
// Query parameters
// ========================================

#[derive(Debug, Deserialize)]
pub struct ListListingsQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteListingQuery {
    pub uid: String,
}

// ========================================
// Handlers
// ========================================

/// GET /api/listings?q= — unsold listings, newest first, search applied.
pub async fn list_listings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListListingsQuery>,
) -> Result<Json<Vec<ListingSummary>>, ApiError> {
    let items = store::list_visible_listings(&state.db).await.map_err(db_error)?;
    let filtered = match query.q.as_deref() {
        Some(q) => filter_by_query(items, q),
        None => items,
    };
    Ok(Json(filtered))
}

/// GET /api/listings/:listing_id — detail plus the owner's nickname.
pub async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
) -> Result<Json<ListingDetailResponse>, ApiError> {
    let row = store::get_listing(&state.db, &listing_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Listing not found".to_string()))?;

    // nickname lookup falls back to a placeholder, never fails the detail
    let owner_name = match &row.owner_uid {
        Some(uid) => store::owner_nickname(&state.db, uid)
            .await
            .map_err(db_error)?
            .unwrap_or_else(|| "사용자".to_string()),
        None => "알 수 없음".to_string(),
    };

    Ok(Json(ListingDetailResponse {
        success: true,
        listing: ListingDetail {
            id: row.listing_id.clone(),
            name: row.title.clone(),
            description: row.description.clone(),
            price: parse_price(&row.price),
            image_url: to_gateway(Some(&row.image_uri)),
            token_uri: row.token_uri.clone(),
            owner_uid: row.owner_uid.clone(),
            owner_address: row.owner_address.clone(),
            owner_name,
            sold: row.sold != 0,
        },
    }))
}

/// POST /api/listings — pin the image and metadata, then persist the
/// listing. Upload failure aborts before any database write.
pub async fn create_listing(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ListingCreateResponse>, ApiError> {
    let form = parse_upload_form(multipart).await?;

    let uid = form
        .uid
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "uid is required".to_string()))?;
    let Some((filename, bytes)) = form.image else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "image is required".to_string(),
        ));
    };
    if form.title.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "title is required".to_string(),
        ));
    }

    // seller wallet: explicit form field, otherwise the bridge's account
    let owner_address = match form.owner_address.filter(|a| !a.is_empty()) {
        Some(addr) => addr,
        None => state.bridge.current_address().await.map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("wallet unavailable: {}", e))
        })?,
    };

    let assets = pin_listing_assets(
        &state.pinata,
        &filename,
        bytes,
        &form.title,
        &form.description,
        &form.price,
    )
    .await
    .map_err(pin_error_response)?;

    let listing_id = store::insert_listing(
        &state.db,
        &store::NewListing {
            title: form.title,
            description: form.description,
            price: form.price,
            image_uri: assets.image_url.clone(),
            token_uri: assets.token_url.clone(),
            owner_uid: uid,
            owner_address,
        },
    )
    .await
    .map_err(db_error)?;

    info!("Listing created: listing_id={}", listing_id);

    Ok(Json(ListingCreateResponse {
        success: true,
        listing_id,
        image_uri: assets.image_url,
        token_uri: assets.token_url,
    }))
}

/// PUT /api/listings/:listing_id — owner-only edit while unsold.
pub async fn update_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<ListingMutationResponse>, ApiError> {
    let row = store::get_listing(&state.db, &listing_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Listing not found".to_string()))?;

    if row.owner_uid.as_deref() != Some(req.uid.as_str()) {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Only the owner can edit this listing".to_string(),
        ));
    }
    if row.sold != 0 {
        return Err(error_response(
            StatusCode::CONFLICT,
            "Listing already sold".to_string(),
        ));
    }

    let price = parse_price(&req.price);
    store::update_listing(
        &state.db,
        &listing_id,
        req.title.trim(),
        req.description.trim(),
        price,
    )
    .await
    .map_err(db_error)?;

    info!("Listing updated: listing_id={}", listing_id);
    Ok(Json(ListingMutationResponse {
        success: true,
        listing_id,
    }))
}

/// DELETE /api/listings/:listing_id?uid= — owner-only, unconditional
/// removal. There is no sold-state check here; a buyer racing a delete is
/// a known gap of the flow.
pub async fn delete_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    Query(query): Query<DeleteListingQuery>,
) -> Result<Json<ListingMutationResponse>, ApiError> {
    let row = store::get_listing(&state.db, &listing_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Listing not found".to_string()))?;

    if row.owner_uid.as_deref() != Some(query.uid.as_str()) {
        return Err(error_response(
            StatusCode::FORBIDDEN,
            "Only the owner can delete this listing".to_string(),
        ));
    }

    store::delete_listing(&state.db, &listing_id)
        .await
        .map_err(db_error)?;

    info!("Listing deleted: listing_id={}", listing_id);
    Ok(Json(ListingMutationResponse {
        success: true,
        listing_id,
    }))
}

/// POST /api/listings/:listing_id/purchase — the settlement flow.
///
/// The contract call blocks until mined and aborts everything on failure.
/// The three bookkeeping writes that follow are independent: a failure
/// surfaces immediately and earlier writes stay in place (no rollback).
pub async fn purchase_listing(
    State(state): State<Arc<AppState>>,
    Path(listing_id): Path<String>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    // 1) preconditions
    let row = store::get_listing(&state.db, &listing_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Listing not found".to_string()))?;

    if row.sold != 0 {
        return Err(error_response(
            StatusCode::CONFLICT,
            "Listing already sold".to_string(),
        ));
    }
    let seller = row
        .owner_address
        .clone()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| {
            error_response(StatusCode::BAD_REQUEST, "Seller address missing".to_string())
        })?;
    if row.token_uri.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "tokenURI missing".to_string(),
        ));
    }

    let price = parse_price(&row.price);

    // 2) on-chain purchase; no bookkeeping is written if this fails
    let outcome = state
        .market
        .purchase(&seller, &row.token_uri, price)
        .await
        .map_err(|e| {
            error_response(StatusCode::BAD_GATEWAY, format!("purchase failed: {}", e))
        })?;

    info!(
        "Purchase mined: listing_id={} token_id={} tx={}",
        listing_id, outcome.token_id, outcome.tx_hash
    );

    // 3) purchase record
    store::upsert_purchase(
        &state.db,
        &req.uid,
        &listing_id,
        outcome.token_id as i64,
        price,
        &seller,
        &outcome.tx_hash,
    )
    .await
    .map_err(db_error)?;

    // 4) ownership mirror
    store::upsert_owned_nft(
        &state.db,
        &req.uid,
        outcome.token_id as i64,
        &row.token_uri,
        &to_gateway(Some(&row.image_uri)),
    )
    .await
    .map_err(db_error)?;

    // 5) sold flag, exactly once
    store::mark_sold(&state.db, &listing_id)
        .await
        .map_err(db_error)?;

    Ok(Json(PurchaseResponse {
        success: true,
        listing_id,
        token_id: outcome.token_id,
        tx_hash: outcome.tx_hash,
    }))
}

fn db_error(e: sqlx::Error) -> ApiError {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {}", e))
}
