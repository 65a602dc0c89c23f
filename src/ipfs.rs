//! Pinning Client
//! Two chained uploads against the Pinata API: the image file first, then
//! the metadata JSON. Each returns a CID; there are no retries.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PinError {
    #[error("PINATA_JWT missing")]
    MissingCredentials,

    #[error("pin upload failed with status {0}")]
    Status(u16),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Clone)]
pub struct PinataClient {
    http: reqwest::Client,
    base_url: String,
    jwt: Option<String>,
}

impl PinataClient {
    pub fn new(base_url: &str, jwt: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            jwt,
        }
    }

    fn jwt(&self) -> Result<&str, PinError> {
        self.jwt.as_deref().ok_or(PinError::MissingCredentials)
    }

    /// pinFileToIPFS — multipart upload of the raw image bytes.
    pub async fn pin_file(&self, filename: &str, bytes: Vec<u8>) -> Result<String, PinError> {
        let jwt = self.jwt()?;
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()));

        let res = self
            .http
            .post(format!("{}/pinning/pinFileToIPFS", self.base_url))
            .bearer_auth(jwt)
            .multipart(form)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(PinError::Status(res.status().as_u16()));
        }
        let pin: PinResponse = res.json().await?;
        info!("pinned file {} -> {}", filename, pin.ipfs_hash);
        Ok(pin.ipfs_hash)
    }

    /// pinJSONToIPFS — upload of the assembled metadata object.
    pub async fn pin_json(&self, value: &serde_json::Value) -> Result<String, PinError> {
        let jwt = self.jwt()?;
        let res = self
            .http
            .post(format!("{}/pinning/pinJSONToIPFS", self.base_url))
            .bearer_auth(jwt)
            .json(value)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(PinError::Status(res.status().as_u16()));
        }
        let pin: PinResponse = res.json().await?;
        info!("pinned metadata -> {}", pin.ipfs_hash);
        Ok(pin.ipfs_hash)
    }
}
