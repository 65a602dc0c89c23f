//! Contract Clients
//! Typed wrappers over the wallet bridge for the two fixed contracts:
//! the NFT marketplace and the ERC-20 faucet token.

pub mod market;
pub mod nfts;
pub mod token;
pub mod units;

pub use market::{MarketContract, PurchaseOutcome};
pub use nfts::OwnedNft;
pub use token::TokenContract;
