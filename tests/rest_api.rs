//! End-to-end HTTP tests: the full router mounted on an ephemeral port,
//! driven with a plain reqwest client. Chain- and pinning-backed routes
//! are covered by their own unit tests; these exercise the store-backed
//! surface.

use std::sync::Arc;

use serde_json::{json, Value};

use nft_market_server::config::AppConfig;
use nft_market_server::store::{self, NewListing};
use nft_market_server::{api_router, db, AppState};

async fn spawn_server() -> (String, db::DbPool) {
    let pool = db::init_memory().await.expect("db");
    let state = Arc::new(AppState::new(AppConfig::default(), pool.clone()));
    let app = api_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{}", addr), pool)
}

async fn seed_listing(pool: &db::DbPool, title: &str, price: &str) -> String {
    store::insert_listing(
        pool,
        &NewListing {
            title: title.to_string(),
            description: "seeded".to_string(),
            price: price.to_string(),
            image_uri: "ipfs://QmSeedImage".to_string(),
            token_uri: "ipfs://QmSeedToken".to_string(),
            owner_uid: "seller-uid".to_string(),
            owner_address: "0x00000000000000000000000000000000000000aa".to_string(),
        },
    )
    .await
    .expect("seed")
}

#[tokio::test]
async fn health_reports_ok() {
    let (base, _pool) = spawn_server().await;
    let body: Value = reqwest::get(format!("{}/api/health", base))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn listing_index_and_search() {
    let (base, pool) = spawn_server().await;
    seed_listing(&pool, "Cool Cat", "0.1").await;
    seed_listing(&pool, "위닝 글러브", "0.2").await;

    let all: Value = reqwest::get(format!("{}/api/listings", base))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(all.as_array().expect("array").len(), 2);

    // the whitespace-stripped match finds the spaced title
    let hits: Value = reqwest::get(format!(
        "{}/api/listings?q=%EC%9C%84%EB%8B%9D%EA%B8%80%EB%9F%AC%EB%B8%8C",
        base
    ))
    .await
    .expect("request")
    .json()
    .await
    .expect("json");
    assert_eq!(hits.as_array().expect("array").len(), 1);
    assert_eq!(hits[0]["name"], "위닝 글러브");

    let none: Value = reqwest::get(format!("{}/api/listings?q=zzz", base))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert!(none.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn listing_detail_resolves_owner_nickname() {
    let (base, pool) = spawn_server().await;
    let id = seed_listing(&pool, "Detail Piece", "1.5").await;
    let client = reqwest::Client::new();

    // before any profile exists the owner falls back to the placeholder
    let detail: Value = client
        .get(format!("{}/api/listings/{}", base, id))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(detail["listing"]["name"], "Detail Piece");
    assert_eq!(detail["listing"]["price"], 1.5);
    assert_eq!(detail["listing"]["owner_name"], "사용자");
    assert_eq!(detail["listing"]["sold"], false);

    let resp = client
        .put(format!("{}/api/users/seller-uid/profile", base))
        .json(&json!({ "nickname": "작가" }))
        .send()
        .await
        .expect("request");
    assert!(resp.status().is_success());

    let detail: Value = client
        .get(format!("{}/api/listings/{}", base, id))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(detail["listing"]["owner_name"], "작가");

    let missing = client
        .get(format!("{}/api/listings/not-a-real-id", base))
        .send()
        .await
        .expect("request");
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn profile_merge_over_http() {
    let (base, _pool) = spawn_server().await;
    let client = reqwest::Client::new();

    client
        .put(format!("{}/api/users/u1/profile", base))
        .json(&json!({ "nickname": "first", "email": "u1@example.com" }))
        .send()
        .await
        .expect("request");
    client
        .put(format!("{}/api/users/u1/profile", base))
        .json(&json!({ "nickname": "second" }))
        .send()
        .await
        .expect("request");

    let body: Value = client
        .get(format!("{}/api/users/u1/profile", base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["profile"]["nickname"], "second");
    assert_eq!(body["profile"]["email"], "u1@example.com");

    let missing = client
        .get(format!("{}/api/users/nobody/profile", base))
        .send()
        .await
        .expect("request");
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn cart_flow_over_http() {
    let (base, pool) = spawn_server().await;
    let id = seed_listing(&pool, "Cart Piece", "0.4").await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/users/buyer/cart", base))
        .json(&json!({ "listing_id": id }))
        .send()
        .await
        .expect("request");
    assert!(resp.status().is_success());

    let cart: Value = client
        .get(format!("{}/api/users/buyer/cart", base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(cart["items"].as_array().expect("array").len(), 1);
    assert_eq!(cart["total_price"], 0.4);

    // unknown listing cannot be carted
    let resp = client
        .post(format!("{}/api/users/buyer/cart", base))
        .json(&json!({ "listing_id": "missing" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status().as_u16(), 404);

    // removing an absent entry still succeeds
    let resp = client
        .delete(format!("{}/api/users/buyer/cart/missing", base))
        .send()
        .await
        .expect("request");
    assert!(resp.status().is_success());

    client
        .delete(format!("{}/api/users/buyer/cart/{}", base, id))
        .send()
        .await
        .expect("request");
    let cart: Value = client
        .get(format!("{}/api/users/buyer/cart", base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert!(cart["items"].as_array().expect("array").is_empty());
    assert_eq!(cart["total_price"], 0.0);
}

#[tokio::test]
async fn like_toggle_over_http() {
    let (base, pool) = spawn_server().await;
    let id = seed_listing(&pool, "Liked Piece", "0.7").await;
    let client = reqwest::Client::new();

    let first: Value = client
        .post(format!("{}/api/users/fan/likes/toggle", base))
        .json(&json!({ "listing_id": id, "title": "Liked Piece" }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(first["liked"], true);

    let likes: Value = client
        .get(format!("{}/api/users/fan/likes", base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(likes["items"].as_array().expect("array").len(), 1);
    assert_eq!(likes["items"][0]["title"], "Liked Piece");

    let second: Value = client
        .post(format!("{}/api/users/fan/likes/toggle", base))
        .json(&json!({ "listing_id": id, "title": "Liked Piece" }))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(second["liked"], false);
}

#[tokio::test]
async fn owner_edit_rules_over_http() {
    let (base, pool) = spawn_server().await;
    let id = seed_listing(&pool, "Editable", "1").await;
    let client = reqwest::Client::new();

    // a stranger cannot edit
    let resp = client
        .put(format!("{}/api/listings/{}", base, id))
        .json(&json!({ "uid": "stranger", "title": "Hijacked", "price": "9" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status().as_u16(), 403);

    // the owner can
    let resp = client
        .put(format!("{}/api/listings/{}", base, id))
        .json(&json!({
            "uid": "seller-uid",
            "title": "Edited",
            "description": "new text",
            "price": "2.5 ETH"
        }))
        .send()
        .await
        .expect("request");
    assert!(resp.status().is_success());

    let detail: Value = client
        .get(format!("{}/api/listings/{}", base, id))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(detail["listing"]["name"], "Edited");
    assert_eq!(detail["listing"]["price"], 2.5);

    // sold listings reject edits
    store::mark_sold(&pool, &id).await.expect("mark sold");
    let resp = client
        .put(format!("{}/api/listings/{}", base, id))
        .json(&json!({ "uid": "seller-uid", "title": "Too late", "price": "1" }))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status().as_u16(), 409);

    // delete is owner-gated but has no sold gate
    let resp = client
        .delete(format!("{}/api/listings/{}?uid=stranger", base, id))
        .send()
        .await
        .expect("request");
    assert_eq!(resp.status().as_u16(), 403);

    let resp = client
        .delete(format!("{}/api/listings/{}?uid=seller-uid", base, id))
        .send()
        .await
        .expect("request");
    assert!(resp.status().is_success());
}

#[tokio::test]
async fn my_page_shelves_over_http() {
    let (base, pool) = spawn_server().await;
    let id = seed_listing(&pool, "Mine", "0.9").await;
    store::mark_sold(&pool, &id).await.expect("mark sold");
    let client = reqwest::Client::new();

    // sold listings still appear on the owner's own shelf
    let mine: Value = client
        .get(format!("{}/api/users/seller-uid/listings", base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(mine["listings"].as_array().expect("array").len(), 1);
    assert_eq!(mine["listings"][0]["sold"], true);

    // but not on the public index
    let public: Value = client
        .get(format!("{}/api/listings", base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert!(public.as_array().expect("array").is_empty());

    let purchases: Value = client
        .get(format!("{}/api/users/seller-uid/purchases", base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert!(purchases["purchases"].as_array().expect("array").is_empty());
}
