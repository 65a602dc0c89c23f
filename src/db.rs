//! Database Module
//! SQLite-backed document store: top-level listings plus the per-user
//! profile/cart/likes/purchases/nfts subtrees.

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::info;

/// Database connection pool
pub type DbPool = Pool<Sqlite>;

/// Initialize the on-disk database.
pub async fn init_db(db_path: &str) -> Result<DbPool> {
    let db_url = format!("sqlite:{}?mode=rwc", db_path);

    info!("Initializing database: {}", db_path);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    create_schema(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

/// In-memory pool for tests. A single connection keeps every query on the
/// same memory database.
pub async fn init_memory() -> Result<DbPool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Schema creation
async fn create_schema(pool: &DbPool) -> Result<()> {
    // listings (top-level collection)
    sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS listings (
            listing_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            price TEXT NOT NULL DEFAULT '0',
            image_uri TEXT NOT NULL DEFAULT '',
            token_uri TEXT NOT NULL DEFAULT '',
            owner_uid TEXT,
            owner_address TEXT,
            sold INTEGER NOT NULL DEFAULT 0,
            created_at_ms INTEGER NOT NULL,
            updated_at_ms INTEGER,
            sold_at_ms INTEGER
        )
    "#)
    .execute(pool)
    .await?;

    // user profiles (users/{uid}/profile/info)
    sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS user_profiles (
            uid TEXT PRIMARY KEY,
            email TEXT,
            nickname TEXT,
            photo_url TEXT,
            created_at_ms INTEGER NOT NULL,
            updated_at_ms INTEGER NOT NULL
        )
    "#)
    .execute(pool)
    .await?;

    // cart (users/{uid}/cart/{listingId})
    sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS cart_items (
            uid TEXT NOT NULL,
            listing_id TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            price REAL NOT NULL DEFAULT 0,
            image_url TEXT NOT NULL DEFAULT '',
            owner_uid TEXT,
            owner_address TEXT,
            added_at_ms INTEGER NOT NULL,
            PRIMARY KEY (uid, listing_id)
        )
    "#)
    .execute(pool)
    .await?;

    // likes (users/{uid}/likes/{docId}); row presence == liked
    sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS likes (
            uid TEXT NOT NULL,
            doc_id TEXT NOT NULL,
            listing_id TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            created_at_ms INTEGER NOT NULL,
            PRIMARY KEY (uid, doc_id)
        )
    "#)
    .execute(pool)
    .await?;

    // purchases (users/{uid}/purchases/{listingId})
    sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS purchases (
            uid TEXT NOT NULL,
            listing_id TEXT NOT NULL,
            token_id INTEGER NOT NULL DEFAULT 0,
            price REAL NOT NULL DEFAULT 0,
            seller TEXT NOT NULL DEFAULT '',
            tx_hash TEXT NOT NULL DEFAULT '',
            purchased_at_ms INTEGER NOT NULL,
            PRIMARY KEY (uid, listing_id)
        )
    "#)
    .execute(pool)
    .await?;

    // owned nft mirror (users/{uid}/nfts/{tokenId})
    sqlx::query(r#"
        CREATE TABLE IF NOT EXISTS owned_nfts (
            uid TEXT NOT NULL,
            token_id INTEGER NOT NULL,
            token_uri TEXT NOT NULL DEFAULT '',
            image_url TEXT NOT NULL DEFAULT '',
            purchased_at_ms INTEGER NOT NULL,
            PRIMARY KEY (uid, token_id)
        )
    "#)
    .execute(pool)
    .await?;

    // indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_sold ON listings(sold)")
        .execute(pool).await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_owner ON listings(owner_uid)")
        .execute(pool).await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_likes_listing ON likes(listing_id)")
        .execute(pool).await?;

    Ok(())
}
