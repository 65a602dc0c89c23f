//! Token Contract Client
//! ERC-20 faucet token: claim / transfer / approve writes and the
//! balanceOf / decimals / symbol / dropAmount / claimed reads.
//!
//! `claimed` and `dropAmount` are faucet extensions the deployed token may
//! or may not carry, so the read helpers report `None` for an unsupported
//! method instead of failing the whole flow.

use std::sync::Arc;

use primitive_types::U256;

use crate::abi::{self, Token};
use crate::contracts::units::{format_units, parse_units};
use crate::rpc::{EthError, Receipt};
use crate::wallet::WalletBridge;

#[derive(Clone)]
pub struct TokenContract {
    bridge: Arc<WalletBridge>,
    address: String,
}

impl TokenContract {
    pub fn new(bridge: Arc<WalletBridge>, address: &str) -> Self {
        Self {
            bridge,
            address: address.to_string(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn read(&self, signature: &str, args: &[Token]) -> Result<Vec<u8>, EthError> {
        let data = abi::encode_call(signature, args)?;
        self.bridge.call_contract(&self.address, &data).await
    }

    /// Same read, but a revert or empty return marks the method as
    /// unsupported rather than erroring.
    async fn read_optional(
        &self,
        signature: &str,
        args: &[Token],
    ) -> Result<Option<Vec<u8>>, EthError> {
        match self.read(signature, args).await {
            Ok(data) if data.is_empty() => Ok(None),
            Ok(data) => Ok(Some(data)),
            Err(EthError::Rpc(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// decimals() — fetched fresh for every formatting operation, never
    /// cached.
    pub async fn decimals(&self) -> Result<u32, EthError> {
        let ret = self.read("decimals()", &[]).await?;
        Ok(abi::decode_uint(&ret)?.low_u32())
    }

    pub async fn symbol(&self) -> Result<String, EthError> {
        let ret = self.read("symbol()", &[]).await?;
        Ok(abi::decode_string(&ret)?)
    }

    /// balanceOf(address), raw.
    pub async fn balance_of(&self, address: &str) -> Result<U256, EthError> {
        let ret = self
            .read("balanceOf(address)", &[Token::Address(address.to_string())])
            .await?;
        Ok(abi::decode_uint(&ret)?)
    }

    /// balanceOf(address), human-readable.
    pub async fn balance_formatted(&self, address: &str) -> Result<String, EthError> {
        let raw = self.balance_of(address).await?;
        let decimals = self.decimals().await?;
        Ok(format_units(raw, decimals))
    }

    /// claimed(address) → has this address already taken the one-time drop?
    /// `None` when the deployed token has no claimed() method.
    pub async fn claimed(&self, address: &str) -> Result<Option<bool>, EthError> {
        let ret = self
            .read_optional("claimed(address)", &[Token::Address(address.to_string())])
            .await?;
        match ret {
            Some(data) => Ok(Some(abi::decode_bool(&data)?)),
            None => Ok(None),
        }
    }

    /// dropAmount(), human-readable. `None` when unsupported.
    pub async fn drop_amount_formatted(&self) -> Result<Option<String>, EthError> {
        let ret = self.read_optional("dropAmount()", &[]).await?;
        match ret {
            Some(data) => {
                let raw = abi::decode_uint(&data)?;
                let decimals = self.decimals().await?;
                Ok(Some(format_units(raw, decimals)))
            }
            None => Ok(None),
        }
    }

    /// Remaining faucet supply, approximated as the token contract's own
    /// balance of itself.
    pub async fn faucet_remaining_formatted(&self) -> Result<String, EthError> {
        let address = self.address.clone();
        let raw = self.balance_of(&address).await?;
        let decimals = self.decimals().await?;
        Ok(format_units(raw, decimals))
    }

    /// claim() — the one-time-per-address grant. The contract enforces
    /// the one-time guarantee; a second claim simply reverts.
    pub async fn claim(&self) -> Result<Receipt, EthError> {
        let data = abi::encode_call("claim()", &[])?;
        self.bridge.send_contract(&self.address, &data, None).await
    }

    /// transfer(to, amount) with a human-readable amount, converted with
    /// freshly fetched decimals. Irreversible once mined.
    pub async fn transfer(&self, to: &str, amount_human: &str) -> Result<Receipt, EthError> {
        let decimals = self.decimals().await?;
        let value = parse_units(amount_human, decimals)?;
        let data = abi::encode_call(
            "transfer(address,uint256)",
            &[Token::Address(to.to_string()), Token::Uint(value)],
        )?;
        self.bridge.send_contract(&self.address, &data, None).await
    }

    /// approve(spender, rawAmount).
    pub async fn approve(&self, spender: &str, amount_raw: U256) -> Result<Receipt, EthError> {
        let data = abi::encode_call(
            "approve(address,uint256)",
            &[Token::Address(spender.to_string()), Token::Uint(amount_raw)],
        )?;
        self.bridge.send_contract(&self.address, &data, None).await
    }
}
