//! Document Store Accessors
//! Read/write wrappers over the SQLite tables. Handlers never touch SQL
//! directly; everything goes through these so the integration tests can
//! exercise the same paths against an in-memory pool.

use chrono::Utc;
use uuid::Uuid;

use crate::db::DbPool;
use crate::gateway::to_gateway;
use crate::models::{
    CartItemRow, LikedItem, ListingRow, ListingSummary, OwnedNftRow, ProfileRow, PurchaseRow,
    UpdateProfileRequest, parse_price,
};

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// ========================================
// Listings
// ========================================

/// Fields of a freshly uploaded listing. The price stays as the free text
/// the seller typed.
#[derive(Debug)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: String,
    pub image_uri: String,
    pub token_uri: String,
    pub owner_uid: String,
    pub owner_address: String,
}

pub fn listing_summary(row: &ListingRow) -> ListingSummary {
    ListingSummary {
        id: row.listing_id.clone(),
        name: row.title.clone(),
        price: parse_price(&row.price),
        image_url: to_gateway(Some(&row.image_uri)),
        description: row.description.clone(),
    }
}

/// Persist a new listing. Returns the generated id.
pub async fn insert_listing(pool: &DbPool, new: &NewListing) -> sqlx::Result<String> {
    let listing_id = Uuid::new_v4().to_string();
    sqlx::query(r#"
        INSERT INTO listings (
            listing_id, title, description, price, image_uri, token_uri,
            owner_uid, owner_address, sold, created_at_ms
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
    "#)
    .bind(&listing_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(&new.price)
    .bind(&new.image_uri)
    .bind(&new.token_uri)
    .bind(&new.owner_uid)
    .bind(&new.owner_address)
    .bind(now_ms())
    .execute(pool)
    .await?;
    Ok(listing_id)
}

/// All unsold listings, newest first, in view shape.
pub async fn list_visible_listings(pool: &DbPool) -> sqlx::Result<Vec<ListingSummary>> {
    let rows: Vec<ListingRow> = sqlx::query_as(
        "SELECT * FROM listings WHERE sold = 0 ORDER BY created_at_ms DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(listing_summary).collect())
}

pub async fn get_listing(pool: &DbPool, listing_id: &str) -> sqlx::Result<Option<ListingRow>> {
    sqlx::query_as("SELECT * FROM listings WHERE listing_id = ?")
        .bind(listing_id)
        .fetch_optional(pool)
        .await
}

/// Listings a user registered, any sold state.
pub async fn listings_of_owner(pool: &DbPool, uid: &str) -> sqlx::Result<Vec<ListingRow>> {
    sqlx::query_as("SELECT * FROM listings WHERE owner_uid = ? ORDER BY created_at_ms DESC")
        .bind(uid)
        .fetch_all(pool)
        .await
}

/// Owner edit of title/description/price. The price arrives already
/// re-parsed to a number and is stored back as its decimal text.
pub async fn update_listing(
    pool: &DbPool,
    listing_id: &str,
    title: &str,
    description: &str,
    price: f64,
) -> sqlx::Result<()> {
    sqlx::query(r#"
        UPDATE listings SET title = ?, description = ?, price = ?, updated_at_ms = ?
        WHERE listing_id = ?
    "#)
    .bind(title)
    .bind(description)
    .bind(price.to_string())
    .bind(now_ms())
    .bind(listing_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete_listing(pool: &DbPool, listing_id: &str) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM listings WHERE listing_id = ?")
        .bind(listing_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Flip the sold flag. Monotonic: there is no way back to unsold.
pub async fn mark_sold(pool: &DbPool, listing_id: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE listings SET sold = 1, sold_at_ms = ? WHERE listing_id = ?")
        .bind(now_ms())
        .bind(listing_id)
        .execute(pool)
        .await?;
    Ok(())
}

// ========================================
// Profiles
// ========================================

/// Merge-upsert: absent request fields keep their stored values, and
/// created_at survives every later write.
pub async fn upsert_profile(
    pool: &DbPool,
    uid: &str,
    req: &UpdateProfileRequest,
) -> sqlx::Result<()> {
    let now = now_ms();
    sqlx::query(r#"
        INSERT INTO user_profiles (uid, email, nickname, photo_url, created_at_ms, updated_at_ms)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(uid) DO UPDATE SET
            email = COALESCE(excluded.email, user_profiles.email),
            nickname = COALESCE(excluded.nickname, user_profiles.nickname),
            photo_url = COALESCE(excluded.photo_url, user_profiles.photo_url),
            updated_at_ms = excluded.updated_at_ms
    "#)
    .bind(uid)
    .bind(&req.email)
    .bind(&req.nickname)
    .bind(&req.photo_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_profile(pool: &DbPool, uid: &str) -> sqlx::Result<Option<ProfileRow>> {
    sqlx::query_as("SELECT * FROM user_profiles WHERE uid = ?")
        .bind(uid)
        .fetch_optional(pool)
        .await
}

/// Display nickname of a listing owner, when one exists.
pub async fn owner_nickname(pool: &DbPool, uid: &str) -> sqlx::Result<Option<String>> {
    let profile = get_profile(pool, uid).await?;
    Ok(profile.and_then(|p| p.nickname))
}

// ========================================
// Cart
// ========================================

/// Add a listing snapshot to the cart (merge-upsert keyed by listing id).
pub async fn add_cart_item(pool: &DbPool, uid: &str, listing: &ListingRow) -> sqlx::Result<()> {
    sqlx::query(r#"
        INSERT INTO cart_items (
            uid, listing_id, title, price, image_url, owner_uid, owner_address, added_at_ms
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(uid, listing_id) DO UPDATE SET
            title = excluded.title,
            price = excluded.price,
            image_url = excluded.image_url,
            added_at_ms = excluded.added_at_ms
    "#)
    .bind(uid)
    .bind(&listing.listing_id)
    .bind(&listing.title)
    .bind(parse_price(&listing.price))
    .bind(to_gateway(Some(&listing.image_uri)))
    .bind(&listing.owner_uid)
    .bind(&listing.owner_address)
    .bind(now_ms())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_cart(pool: &DbPool, uid: &str) -> sqlx::Result<Vec<CartItemRow>> {
    sqlx::query_as("SELECT * FROM cart_items WHERE uid = ? ORDER BY added_at_ms DESC")
        .bind(uid)
        .fetch_all(pool)
        .await
}

/// Remove one cart entry. Removing an id that is not there is a no-op,
/// reported through the returned row count.
pub async fn remove_cart_item(pool: &DbPool, uid: &str, listing_id: &str) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE uid = ? AND listing_id = ?")
        .bind(uid)
        .bind(listing_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ========================================
// Likes
// ========================================

/// Toggle the like row for `doc_id`. Returns the new liked state.
pub async fn toggle_like(
    pool: &DbPool,
    uid: &str,
    doc_id: &str,
    listing_id: &str,
    title: &str,
) -> sqlx::Result<bool> {
    let removed = sqlx::query("DELETE FROM likes WHERE uid = ? AND doc_id = ?")
        .bind(uid)
        .bind(doc_id)
        .execute(pool)
        .await?
        .rows_affected();

    if removed > 0 {
        return Ok(false);
    }

    sqlx::query(r#"
        INSERT INTO likes (uid, doc_id, listing_id, title, created_at_ms)
        VALUES (?, ?, ?, ?, ?)
    "#)
    .bind(uid)
    .bind(doc_id)
    .bind(listing_id)
    .bind(title)
    .bind(now_ms())
    .execute(pool)
    .await?;
    Ok(true)
}

/// Liked listings joined back against the listings table; likes whose
/// listing has disappeared are silently dropped.
pub async fn list_liked(pool: &DbPool, uid: &str) -> sqlx::Result<Vec<LikedItem>> {
    let rows: Vec<ListingRow> = sqlx::query_as(r#"
        SELECT li.* FROM likes lk
        JOIN listings li ON li.listing_id = lk.listing_id
        WHERE lk.uid = ?
        ORDER BY lk.created_at_ms DESC
    "#)
    .bind(uid)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| LikedItem {
            id: row.listing_id.clone(),
            title: row.title.clone(),
            price: parse_price(&row.price),
            image_url: to_gateway(Some(&row.image_uri)),
        })
        .collect())
}

// ========================================
// Purchases / owned NFTs
// ========================================

pub async fn upsert_purchase(
    pool: &DbPool,
    uid: &str,
    listing_id: &str,
    token_id: i64,
    price: f64,
    seller: &str,
    tx_hash: &str,
) -> sqlx::Result<()> {
    sqlx::query(r#"
        INSERT INTO purchases (uid, listing_id, token_id, price, seller, tx_hash, purchased_at_ms)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(uid, listing_id) DO UPDATE SET
            token_id = excluded.token_id,
            price = excluded.price,
            seller = excluded.seller,
            tx_hash = excluded.tx_hash
    "#)
    .bind(uid)
    .bind(listing_id)
    .bind(token_id)
    .bind(price)
    .bind(seller)
    .bind(tx_hash)
    .bind(now_ms())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_purchases(pool: &DbPool, uid: &str) -> sqlx::Result<Vec<PurchaseRow>> {
    sqlx::query_as("SELECT * FROM purchases WHERE uid = ? ORDER BY purchased_at_ms DESC")
        .bind(uid)
        .fetch_all(pool)
        .await
}

pub async fn upsert_owned_nft(
    pool: &DbPool,
    uid: &str,
    token_id: i64,
    token_uri: &str,
    image_url: &str,
) -> sqlx::Result<()> {
    sqlx::query(r#"
        INSERT INTO owned_nfts (uid, token_id, token_uri, image_url, purchased_at_ms)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(uid, token_id) DO UPDATE SET
            token_uri = excluded.token_uri,
            image_url = excluded.image_url
    "#)
    .bind(uid)
    .bind(token_id)
    .bind(token_uri)
    .bind(image_url)
    .bind(now_ms())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_owned_nfts(pool: &DbPool, uid: &str) -> sqlx::Result<Vec<OwnedNftRow>> {
    sqlx::query_as("SELECT * FROM owned_nfts WHERE uid = ? ORDER BY token_id")
        .bind(uid)
        .fetch_all(pool)
        .await
}
