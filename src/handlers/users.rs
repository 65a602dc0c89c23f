//! User API Handlers
//! Per-user subtrees: profile, cart, likes, purchases, and owned NFTs
//! (on-chain enumeration merged with the local mirror records).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::contracts::nfts::{owned_nfts_on_chain, OwnedNft};
use crate::models::{
    AddCartRequest, CartItemRow, LikedItem, OwnedNftRow, ProfileRow, PurchaseRow,
    ToggleLikeRequest, UpdateProfileRequest, make_safe_id,
};
use crate::store;
use crate::AppState;

use super::{error_response, ApiError};

// ========================================
// Response types
// ========================================

#[derive(Serialize)]
pub struct OkResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: ProfileRow,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub items: Vec<CartItemRow>,
    pub total_price: f64,
}

#[derive(Serialize)]
pub struct ToggleLikeResponse {
    pub success: bool,
    pub liked: bool,
}

#[derive(Serialize)]
pub struct LikesResponse {
    pub success: bool,
    pub items: Vec<LikedItem>,
}

#[derive(Serialize)]
pub struct PurchasesResponse {
    pub success: bool,
    pub purchases: Vec<PurchaseRow>,
}

#[derive(Serialize)]
pub struct MyListingsResponse {
    pub success: bool,
    pub listings: Vec<MyListing>,
}

/// Listing as shown on the my-page shelf, sold ones included.
#[derive(Serialize)]
pub struct MyListing {
    pub id: String,
    pub title: String,
    pub price: f64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub sold: bool,
}

#[derive(Serialize)]
pub struct OwnedNftsResponse {
    pub success: bool,
    /// Authoritative: re-derived from tokensOfOwner on every request.
    pub on_chain: Vec<OwnedNft>,
    /// Local mirror written at purchase time; may lag the chain.
    pub records: Vec<OwnedNftRow>,
}

#[derive(Debug, Deserialize)]
pub struct NftsQuery {
    pub address: Option<String>,
}

// ========================================
// Profile
// ========================================

/// PUT /api/users/:uid/profile — merge-upsert; doubles as the auth-state
/// sync write on login.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    store::upsert_profile(&state.db, &uid, &req)
        .await
        .map_err(db_error)?;
    info!("Profile saved: uid={}", uid);
    Ok(Json(OkResponse { success: true }))
}

/// GET /api/users/:uid/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = store::get_profile(&state.db, &uid)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Profile not found".to_string()))?;
    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

// ========================================
// Cart
// ========================================

/// POST /api/users/:uid/cart — snapshot the listing into the cart.
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(req): Json<AddCartRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let listing = store::get_listing(&state.db, &req.listing_id)
        .await
        .map_err(db_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Listing not found".to_string()))?;

    store::add_cart_item(&state.db, &uid, &listing)
        .await
        .map_err(db_error)?;
    Ok(Json(OkResponse { success: true }))
}

/// GET /api/users/:uid/cart
pub async fn list_cart(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let items = store::list_cart(&state.db, &uid).await.map_err(db_error)?;
    let total_price = items.iter().map(|item| item.price).sum();
    Ok(Json(CartResponse {
        success: true,
        items,
        total_price,
    }))
}

/// DELETE /api/users/:uid/cart/:listing_id — removing an id that is not
/// in the cart is a quiet no-op, not an error.
pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    Path((uid, listing_id)): Path<(String, String)>,
) -> Result<Json<OkResponse>, ApiError> {
    store::remove_cart_item(&state.db, &uid, &listing_id)
        .await
        .map_err(db_error)?;
    Ok(Json(OkResponse { success: true }))
}

// ========================================
// Likes
// ========================================

/// POST /api/users/:uid/likes/toggle — like on first call, unlike on the
/// second. The document id comes from the sanitized title, falling back
/// to the listing id.
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Json(req): Json<ToggleLikeRequest>,
) -> Result<Json<ToggleLikeResponse>, ApiError> {
    let safe = make_safe_id(&req.title);
    let doc_id = if safe.is_empty() { req.listing_id.clone() } else { safe };

    let liked = store::toggle_like(&state.db, &uid, &doc_id, &req.listing_id, &req.title)
        .await
        .map_err(db_error)?;
    Ok(Json(ToggleLikeResponse {
        success: true,
        liked,
    }))
}

/// GET /api/users/:uid/likes
pub async fn list_likes(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<LikesResponse>, ApiError> {
    let items = store::list_liked(&state.db, &uid).await.map_err(db_error)?;
    Ok(Json(LikesResponse {
        success: true,
        items,
    }))
}

// ========================================
// Purchases / owned NFTs / my listings
// ========================================

/// GET /api/users/:uid/purchases
pub async fn list_purchases(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<PurchasesResponse>, ApiError> {
    let purchases = store::list_purchases(&state.db, &uid)
        .await
        .map_err(db_error)?;
    Ok(Json(PurchasesResponse {
        success: true,
        purchases,
    }))
}

/// GET /api/users/:uid/listings — everything the user registered.
pub async fn list_my_listings(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<MyListingsResponse>, ApiError> {
    let rows = store::listings_of_owner(&state.db, &uid)
        .await
        .map_err(db_error)?;
    let listings = rows
        .into_iter()
        .map(|row| MyListing {
            id: row.listing_id.clone(),
            title: row.title.clone(),
            price: crate::models::parse_price(&row.price),
            image_url: crate::gateway::to_gateway(Some(&row.image_uri)),
            sold: row.sold != 0,
        })
        .collect();
    Ok(Json(MyListingsResponse {
        success: true,
        listings,
    }))
}

/// GET /api/users/:uid/nfts?address= — on-chain holdings for the given
/// wallet (the bridge account when absent) next to the mirror records.
/// A wallet/chain failure degrades the on-chain half to empty instead of
/// failing the whole page.
pub async fn list_owned_nfts(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Query(query): Query<NftsQuery>,
) -> Result<Json<OwnedNftsResponse>, ApiError> {
    let records = store::list_owned_nfts(&state.db, &uid)
        .await
        .map_err(db_error)?;

    let on_chain = match resolve_address(&state, query.address).await {
        Ok(address) => match owned_nfts_on_chain(&state.market, &state.http, &address).await {
            Ok(nfts) => nfts,
            Err(e) => {
                warn!("on-chain NFT lookup failed: {}", e);
                Vec::new()
            }
        },
        Err(e) => {
            warn!("wallet address unavailable: {}", e);
            Vec::new()
        }
    };

    Ok(Json(OwnedNftsResponse {
        success: true,
        on_chain,
        records,
    }))
}

async fn resolve_address(
    state: &AppState,
    requested: Option<String>,
) -> Result<String, crate::rpc::EthError> {
    match requested.filter(|a| !a.is_empty()) {
        Some(address) => Ok(address),
        None => state.bridge.current_address().await,
    }
}

fn db_error(e: sqlx::Error) -> ApiError {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, format!("DB error: {}", e))
}
