//! On-Chain NFT Enumeration
//! tokensOfOwner + tokenURI walk with best-effort metadata resolution:
//! a token whose metadata cannot be fetched or parsed still shows up,
//! with the metadata URL standing in for the image.

use serde::Serialize;
use tracing::warn;

use crate::contracts::market::MarketContract;
use crate::gateway::to_gateway;
use crate::rpc::EthError;

#[derive(Debug, Clone, Serialize)]
pub struct OwnedNft {
    #[serde(rename = "tokenId")]
    pub token_id: u64,
    #[serde(rename = "metadataURI")]
    pub metadata_uri: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Decide the display image from a fetched metadata body. JSON metadata
/// contributes its `image` / `image_url` field (gateway-resolved); a raw
/// payload means the metadata URL itself is the image.
pub fn image_from_metadata_body(body: &str, meta_url: &str) -> String {
    let trimmed = body.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return meta_url.to_string();
    }
    let Ok(meta) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return meta_url.to_string();
    };
    let image_field = meta
        .get("image")
        .and_then(|v| v.as_str())
        .or_else(|| meta.get("image_url").and_then(|v| v.as_str()));
    match image_field {
        Some(image) => to_gateway(Some(image)),
        None => meta_url.to_string(),
    }
}

/// Enumerate the NFTs an address holds on-chain. Per-token failures
/// degrade that token only; a tokenURI read failure skips the token
/// entirely.
pub async fn owned_nfts_on_chain(
    market: &MarketContract,
    http: &reqwest::Client,
    owner: &str,
) -> Result<Vec<OwnedNft>, EthError> {
    let token_ids = market.tokens_of_owner(owner).await?;
    let mut results = Vec::with_capacity(token_ids.len());

    for token_id in token_ids {
        let metadata_uri = match market.token_uri(token_id).await {
            Ok(uri) => uri,
            Err(e) => {
                warn!("tokenURI({}) lookup failed: {}", token_id, e);
                continue;
            }
        };
        let meta_url = to_gateway(Some(&metadata_uri));

        let image_url = match http.get(&meta_url).send().await {
            Ok(res) if res.status().is_success() => match res.text().await {
                Ok(body) => image_from_metadata_body(&body, &meta_url),
                Err(_) => meta_url.clone(),
            },
            _ => meta_url.clone(),
        };

        results.push(OwnedNft {
            token_id,
            metadata_uri,
            image_url,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_metadata_contributes_its_image_field() {
        let body = r#"{"name":"x","image":"ipfs://QmImg"}"#;
        assert_eq!(
            image_from_metadata_body(body, "https://gw/meta"),
            "https://gateway.pinata.cloud/ipfs/QmImg"
        );
    }

    #[test]
    fn image_url_field_is_the_second_choice() {
        let body = r#"{"image_url":"https://example.com/a.png"}"#;
        assert_eq!(
            image_from_metadata_body(body, "https://gw/meta"),
            "https://example.com/a.png"
        );
    }

    #[test]
    fn raw_payloads_fall_back_to_the_metadata_url() {
        assert_eq!(
            image_from_metadata_body("\u{89}PNG...", "https://gw/meta"),
            "https://gw/meta"
        );
    }

    #[test]
    fn broken_json_falls_back_to_the_metadata_url() {
        assert_eq!(
            image_from_metadata_body("{not json", "https://gw/meta"),
            "https://gw/meta"
        );
        assert_eq!(
            image_from_metadata_body(r#"{"image": 3}"#, "https://gw/meta"),
            "https://gw/meta"
        );
    }
}
