//! Upload API Handler
//! POST /api/ipfs — two chained pins: the image file, then the metadata
//! JSON assembled around its gateway URL.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::gateway::GATEWAY_BASE;
use crate::ipfs::{PinError, PinataClient};
use crate::AppState;

use super::{error_response, ApiError};

// ========================================
// Types
// ========================================

/// Parsed multipart form shared by the upload endpoint and listing create.
pub(super) struct UploadForm {
    pub image: Option<(String, Vec<u8>)>,
    pub title: String,
    pub description: String,
    pub price: String,
    pub uid: Option<String>,
    pub owner_address: Option<String>,
}

/// Result of the two chained pins.
pub(super) struct ListingAssets {
    pub image_cid: String,
    pub token_cid: String,
    pub image_url: String,
    pub token_url: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub title: String,
    pub description: String,
    pub price: String,
    #[serde(rename = "imageURI")]
    pub image_uri: String,
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
    #[serde(rename = "imageCID")]
    pub image_cid: String,
    #[serde(rename = "tokenCID")]
    pub token_cid: String,
}

// ========================================
// Helpers
// ========================================

pub(super) async fn parse_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        image: None,
        title: String::new(),
        description: String::new(),
        price: String::new(),
        uid: None,
        owner_address: None,
    };

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, format!("Field read error: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let filename = field
                    .file_name()
                    .unwrap_or("image.bin")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    error_response(StatusCode::BAD_REQUEST, format!("File read error: {}", e))
                })?;
                form.image = Some((filename, bytes.to_vec()));
            }
            "title" => form.title = read_text(field, "title").await?,
            "description" => form.description = read_text(field, "description").await?,
            "price" => form.price = read_text(field, "price").await?,
            "uid" => form.uid = Some(read_text(field, "uid").await?),
            "owner_address" => form.owner_address = Some(read_text(field, "owner_address").await?),
            _ => {}
        }
    }

    form.title = form.title.trim().to_string();
    form.description = form.description.trim().to_string();
    form.price = form.price.trim().to_string();
    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String, ApiError> {
    field.text().await.map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, format!("{} read error: {}", name, e))
    })
}

/// Pin the image, then pin the metadata JSON referencing its gateway URL.
/// A failure at either step aborts before any listing row exists.
pub(super) async fn pin_listing_assets(
    pinata: &PinataClient,
    filename: &str,
    image_bytes: Vec<u8>,
    title: &str,
    description: &str,
    price: &str,
) -> Result<ListingAssets, PinError> {
    let image_cid = pinata.pin_file(filename, image_bytes).await?;
    // gateway URL instead of ipfs:// so wallets render the image directly
    let image_url = format!("{}{}", GATEWAY_BASE, image_cid);

    let metadata = json!({
        "name": title,
        "description": description,
        "image": image_url,
        "properties": { "price": price },
    });
    let token_cid = pinata.pin_json(&metadata).await?;
    let token_url = format!("{}{}", GATEWAY_BASE, token_cid);

    Ok(ListingAssets {
        image_cid,
        token_cid,
        image_url,
        token_url,
    })
}

pub(super) fn pin_error_response(e: PinError) -> ApiError {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// ========================================
// Handler
// ========================================

/// POST /api/ipfs — upload an image + metadata pair without creating a
/// listing record.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = parse_upload_form(multipart).await?;

    let Some((filename, bytes)) = form.image else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "image and title are required".to_string(),
        ));
    };
    if form.title.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "image and title are required".to_string(),
        ));
    }

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

    Ok(Json(UploadResponse {
        title: form.title,
        description: form.description,
        price: form.price,
        image_uri: assets.image_url,
        token_uri: assets.token_url,
        image_cid: assets.image_cid,
        token_cid: assets.token_cid,
    }))
}
