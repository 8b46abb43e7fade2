//! The wallet backend selected by configuration.

use alloy_primitives::{Address, TxHash};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use portal_config::{Config, WalletKind};
use tokio::sync::broadcast;

use crate::{
    error::WalletSignerError,
    local::LocalSignerProvider,
    provider::{ProviderError, ProviderEvent, TransactionSender, WalletProvider},
    wallet_browser::{error::BrowserWalletError, provider::BrowserProvider},
};

/// Either a browser wallet reached through the local bridge or a local private key.
#[derive(Clone, Debug)]
pub enum WalletBackend {
    /// Wallet injected into a browser page.
    Browser(BrowserProvider),
    /// Raw private key, for development.
    Local(LocalSignerProvider),
}

impl WalletBackend {
    /// Builds the backend named by `config.wallet`.
    ///
    /// The browser bridge is started right away so its URL can be shown before connecting.
    pub async fn from_config(config: &Config) -> Result<Self, WalletSignerError> {
        match config.wallet {
            WalletKind::Browser => {
                let provider =
                    BrowserProvider::spawn(config.browser_port, config.request_timeout()).await?;
                Ok(Self::Browser(provider))
            }
            WalletKind::Local => {
                let private_key =
                    config.private_key.as_deref().ok_or(WalletSignerError::MissingPrivateKey)?;
                let provider =
                    LocalSignerProvider::new(&config.rpc_url, private_key, config.chain_id)?;
                Ok(Self::Local(provider))
            }
        }
    }

    /// Which kind of backend this is.
    pub fn kind(&self) -> WalletKind {
        match self {
            Self::Browser(_) => WalletKind::Browser,
            Self::Local(_) => WalletKind::Local,
        }
    }

    /// Releases what the backend holds. Stops the browser bridge, a no-op for local keys.
    pub async fn shutdown(&self) -> Result<(), BrowserWalletError> {
        match self {
            Self::Browser(provider) => provider.shutdown().await,
            Self::Local(_) => Ok(()),
        }
    }
}

macro_rules! delegate {
    ($s:ident, $inner:ident => $e:expr) => {
        match $s {
            Self::Browser($inner) => $e,
            Self::Local($inner) => $e,
        }
    };
}

#[async_trait]
impl WalletProvider for WalletBackend {
    async fn enable(&self) -> Result<Address, ProviderError> {
        delegate!(self, inner => inner.enable().await)
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        delegate!(self, inner => inner.chain_id().await)
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        delegate!(self, inner => inner.subscribe())
    }
}

#[async_trait]
impl TransactionSender for WalletBackend {
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ProviderError> {
        delegate!(self, inner => inner.send_transaction(request).await)
    }
}
