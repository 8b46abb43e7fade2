use std::time::Duration;

use alloy_primitives::{Address, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    provider::{ProviderError, ProviderEvent, TransactionSender, WalletProvider},
    wallet_browser::{error::BrowserWalletError, server::BrowserWalletServer, types::BrowserTransaction},
};

/// A wallet injected into a browser page (MetaMask and friends), reached through a
/// [`BrowserWalletServer`].
///
/// Transactions are signed and sent by the wallet in one step via `eth_sendTransaction`.
#[derive(Clone, Debug)]
pub struct BrowserProvider {
    server: BrowserWalletServer,
}

impl BrowserProvider {
    /// Starts the bridge on `port` (`0` for any free port).
    pub async fn spawn(port: u16, timeout: Duration) -> Result<Self, BrowserWalletError> {
        let mut server = BrowserWalletServer::new(port, timeout);
        server.start().await?;
        Ok(Self { server })
    }

    /// Wraps an already started server.
    pub fn new(server: BrowserWalletServer) -> Self {
        Self { server }
    }

    /// The underlying bridge.
    pub fn server(&self) -> &BrowserWalletServer {
        &self.server
    }

    /// Stops the bridge.
    pub async fn shutdown(&self) -> Result<(), BrowserWalletError> {
        self.server.stop().await
    }
}

impl From<BrowserWalletError> for ProviderError {
    fn from(err: BrowserWalletError) -> Self {
        match err {
            BrowserWalletError::Rejected { reason, .. } => Self::Rejected(reason),
            BrowserWalletError::Unavailable(message) => Self::Unavailable(message),
            BrowserWalletError::NotRunning | BrowserWalletError::Server(_) => {
                Self::Unavailable(err.to_string())
            }
            BrowserWalletError::Timeout { .. } | BrowserWalletError::NotConnected => {
                Self::Failed(err.to_string())
            }
        }
    }
}

#[async_trait]
impl WalletProvider for BrowserProvider {
    async fn enable(&self) -> Result<Address, ProviderError> {
        if !self.server.is_running() {
            return Err(BrowserWalletError::NotRunning.into());
        }
        info!("open {} in a browser with a wallet extension to connect", self.server.url());
        let connection = self.server.wait_for_connection().await?;
        Ok(connection.address)
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        self.server
            .get_connection()
            .map(|connection| connection.chain_id)
            .ok_or_else(|| BrowserWalletError::NotConnected.into())
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.server.subscribe()
    }
}

#[async_trait]
impl TransactionSender for BrowserProvider {
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ProviderError> {
        let tx = BrowserTransaction { id: Uuid::new_v4(), request };
        Ok(self.server.request_transaction(tx).await?)
    }
}
