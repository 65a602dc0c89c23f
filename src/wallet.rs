//! Wallet Bridge
//! Obtains the active signing address from the provider and funnels every
//! contract read/write through it, mirroring how the browser app went
//! through the injected provider for all signing.

use primitive_types::U256;

use crate::rpc::{EthError, EthRpcClient, Receipt};

pub struct WalletBridge {
    rpc: EthRpcClient,
}

impl WalletBridge {
    pub fn new(rpc_url: &str) -> Self {
        Self {
            rpc: EthRpcClient::new(rpc_url),
        }
    }

    /// First account of the provider. Errors when the provider exposes
    /// no unlocked account (nothing to sign with).
    pub async fn current_address(&self) -> Result<String, EthError> {
        let accounts = self.rpc.accounts().await?;
        accounts.into_iter().next().ok_or(EthError::NoAccounts)
    }

    /// Read-only contract call.
    pub async fn call_contract(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, EthError> {
        self.rpc.eth_call(to, data).await
    }

    /// Signed contract transaction; blocks until the receipt is available.
    pub async fn send_contract(
        &self,
        to: &str,
        data: &[u8],
        value: Option<U256>,
    ) -> Result<Receipt, EthError> {
        let from = self.current_address().await?;
        let tx_hash = self.rpc.send_transaction(&from, to, data, value).await?;
        self.rpc.wait_for_receipt(&tx_hash).await
    }
}
