//! Marketplace Contract Client
//! purchase / mint / transferNFT / updateTokenURI writes and the
//! tokensOfOwner / tokenURI reads against the fixed NFT contract.

use std::sync::Arc;

use crate::abi::{self, Token};
use crate::contracts::units::parse_units;
use crate::rpc::{EthError, Receipt};
use crate::wallet::WalletBridge;

/// ETH uses 18 decimals when converting a listing price to wei.
const ETH_DECIMALS: u32 = 18;

#[derive(Clone)]
pub struct MarketContract {
    bridge: Arc<WalletBridge>,
    address: String,
}

/// Result of a settled purchase transaction.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub token_id: u64,
    pub tx_hash: String,
}

impl MarketContract {
    pub fn new(bridge: Arc<WalletBridge>, address: &str) -> Self {
        Self {
            bridge,
            address: address.to_string(),
        }
    }

    /// purchase(seller, metadataURI) payable — the price rides along as
    /// the transaction value. Blocks until mined; any failure here means
    /// no bookkeeping may be written.
    pub async fn purchase(
        &self,
        seller: &str,
        metadata_uri: &str,
        price_eth: f64,
    ) -> Result<PurchaseOutcome, EthError> {
        let value = parse_units(&price_eth.to_string(), ETH_DECIMALS)?;
        let data = abi::encode_call(
            "purchase(address,string)",
            &[
                Token::Address(seller.to_string()),
                Token::Str(metadata_uri.to_string()),
            ],
        )?;
        let receipt = self
            .bridge
            .send_contract(&self.address, &data, Some(value))
            .await?;
        Ok(PurchaseOutcome {
            token_id: extract_token_id(&receipt),
            tx_hash: receipt.transaction_hash,
        })
    }

    /// Admin mint(to, metadataURI).
    pub async fn mint(&self, to: &str, metadata_uri: &str) -> Result<Receipt, EthError> {
        let data = abi::encode_call(
            "mint(address,string)",
            &[
                Token::Address(to.to_string()),
                Token::Str(metadata_uri.to_string()),
            ],
        )?;
        self.bridge.send_contract(&self.address, &data, None).await
    }

    pub async fn transfer_nft(&self, to: &str, token_id: u64) -> Result<Receipt, EthError> {
        let data = abi::encode_call(
            "transferNFT(address,uint256)",
            &[
                Token::Address(to.to_string()),
                Token::Uint(token_id.into()),
            ],
        )?;
        self.bridge.send_contract(&self.address, &data, None).await
    }

    pub async fn update_token_uri(
        &self,
        token_id: u64,
        metadata_uri: &str,
    ) -> Result<Receipt, EthError> {
        let data = abi::encode_call(
            "updateTokenURI(uint256,string)",
            &[
                Token::Uint(token_id.into()),
                Token::Str(metadata_uri.to_string()),
            ],
        )?;
        self.bridge.send_contract(&self.address, &data, None).await
    }

    /// tokensOfOwner(address) → uint256[]
    pub async fn tokens_of_owner(&self, owner: &str) -> Result<Vec<u64>, EthError> {
        let data = abi::encode_call(
            "tokensOfOwner(address)",
            &[Token::Address(owner.to_string())],
        )?;
        let ret = self.bridge.call_contract(&self.address, &data).await?;
        let ids = abi::decode_uint_array(&ret)?;
        Ok(ids.into_iter().map(|id| id.low_u64()).collect())
    }

    /// tokenURI(uint256) → string
    pub async fn token_uri(&self, token_id: u64) -> Result<String, EthError> {
        let data = abi::encode_call("tokenURI(uint256)", &[Token::Uint(token_id.into())])?;
        let ret = self.bridge.call_contract(&self.address, &data).await?;
        Ok(abi::decode_string(&ret)?)
    }
}

/// Pull the minted token id out of the receipt logs.
///
/// The Transfer event topic is matched first; the 4-topic shape check is
/// kept as a compatibility fallback for providers that report anonymous
/// log entries. No match means token id 0.
pub fn extract_token_id(receipt: &Receipt) -> u64 {
    let transfer_topic = abi::transfer_event_topic();

    let log = receipt
        .logs
        .iter()
        .find(|log| log.topics.len() == 4 && log.topics[0] == transfer_topic)
        .or_else(|| receipt.logs.iter().find(|log| log.topics.len() == 4));

    let Some(log) = log else {
        return 0;
    };
    u64::from_str_radix(log.topics[3].trim_start_matches("0x"), 16).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::LogEntry;

    fn receipt_with_logs(logs: Vec<LogEntry>) -> Receipt {
        Receipt {
            transaction_hash: "0xabc".to_string(),
            status: Some("0x1".to_string()),
            logs,
        }
    }

    fn log(topics: Vec<&str>) -> LogEntry {
        LogEntry {
            address: "0x0".to_string(),
            topics: topics.into_iter().map(|t| t.to_string()).collect(),
            data: "0x".to_string(),
        }
    }

    #[test]
    fn token_id_comes_from_transfer_event_topic_3() {
        let topic0 = abi::transfer_event_topic();
        let receipt = receipt_with_logs(vec![
            log(vec!["0x1", "0x2"]),
            log(vec![&topic0, "0x0", "0x0", "0x2a"]),
        ]);
        assert_eq!(extract_token_id(&receipt), 42);
    }

    #[test]
    fn four_topic_shape_is_the_fallback() {
        let receipt = receipt_with_logs(vec![log(vec!["0xdead", "0x0", "0x0", "0x07"])]);
        assert_eq!(extract_token_id(&receipt), 7);
    }

    #[test]
    fn missing_mint_log_defaults_to_zero() {
        let receipt = receipt_with_logs(vec![log(vec!["0x1"])]);
        assert_eq!(extract_token_id(&receipt), 0);
        assert_eq!(extract_token_id(&receipt_with_logs(vec![])), 0);
    }
}
