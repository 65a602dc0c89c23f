//! Data Models
//! Listing, UserProfile, CartItem, Like, Purchase, OwnedNft row and API types.

use serde::{Deserialize, Serialize};

// ========================================
// Listing
// ========================================

/// Listing (DB row). `price` is stored as free text ("0.1", "0.1 ETH", ...)
/// and coerced to a number at read time, matching how uploads persist it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ListingRow {
    pub listing_id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub image_uri: String,
    pub token_uri: String,
    pub owner_uid: Option<String>,
    pub owner_address: Option<String>,
    pub sold: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: Option<i64>,
    pub sold_at_ms: Option<i64>,
}

/// Listing index entry (API view shape).
#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub description: String,
}

/// Listing detail with the owner's display nickname resolved.
#[derive(Debug, Serialize)]
pub struct ListingDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
    pub owner_uid: Option<String>,
    pub owner_address: Option<String>,
    pub owner_name: String,
    pub sold: bool,
}

/// Listing update request (owner-only edit of title/description/price).
#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    pub uid: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
}

/// Purchase request (buyer identity; the wallet address comes from the bridge).
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub uid: String,
}

// ========================================
// User profile
// ========================================

/// UserProfile (DB row). One row per uid, merge-updated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProfileRow {
    pub uid: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub photo_url: Option<String>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Profile upsert request (also the auth-state sync write).
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

// ========================================
// Cart
// ========================================

/// CartItem (DB row). A denormalized snapshot of the listing at add time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItemRow {
    pub uid: String,
    pub listing_id: String,
    pub title: String,
    pub price: f64,
    pub image_url: String,
    pub owner_uid: Option<String>,
    pub owner_address: Option<String>,
    pub added_at_ms: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddCartRequest {
    pub listing_id: String,
}

// ========================================
// Likes
// ========================================

/// Like (DB row). Row presence is the liked state; there is no flag column.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LikeRow {
    pub uid: String,
    pub doc_id: String,
    pub listing_id: String,
    pub title: String,
    pub created_at_ms: i64,
}

#[derive(Debug, Deserialize)]
pub struct ToggleLikeRequest {
    pub listing_id: String,
    #[serde(default)]
    pub title: String,
}

/// Liked listing joined back against the listings table.
#[derive(Debug, Serialize)]
pub struct LikedItem {
    pub id: String,
    pub title: String,
    pub price: f64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

// ========================================
// Purchases / owned NFTs
// ========================================

/// PurchaseRecord (DB row). Immutable after insert.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PurchaseRow {
    pub uid: String,
    pub listing_id: String,
    pub token_id: i64,
    pub price: f64,
    pub seller: String,
    pub tx_hash: String,
    pub purchased_at_ms: i64,
}

/// OwnedNftRecord (DB row). Local mirror of on-chain ownership, not
/// authoritative; the chain is re-queried via tokensOfOwner.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OwnedNftRow {
    pub uid: String,
    pub token_id: i64,
    pub token_uri: String,
    pub image_url: String,
    pub purchased_at_ms: i64,
}

// ========================================
// Helpers
// ========================================

/// Parse a stored price into ETH as a number, invalid → 0.
///
/// Mirrors `parseFloat`: the longest numeric prefix wins, so "0.1 ETH"
/// parses to 0.1 and garbage parses to 0.
pub fn parse_price(raw: &str) -> f64 {
    let s = raw.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }

    if !seen_digit {
        return 0.0;
    }
    s[..end].parse::<f64>().unwrap_or(0.0)
}

/// Turn a title into a safe like-document id: whitespace → "-", strip
/// everything outside alphanumerics / Hangul / "-" / "_", cap at 40 chars.
/// Callers fall back to the listing id when this comes out empty.
pub fn make_safe_id(title: &str) -> String {
    title
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric() || ('가'..='힣').contains(c) || *c == '-' || *c == '_'
        })
        .take(40)
        .collect()
}
