//! Collaborator interfaces the session and the mint client are written against.

use alloy_json_rpc::RpcError;
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use auto_impl::auto_impl;
use tokio::sync::broadcast;

/// Capacity of provider event channels.
pub(crate) const EVENT_CAPACITY: usize = 16;

/// Notifications pushed by a wallet provider after it has been enabled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The selected account changed (EIP-1193 `accountsChanged`).
    AccountsChanged(Address),
    /// The selected network changed (EIP-1193 `chainChanged`), as a hex string.
    ChainChanged(String),
    /// The wallet went away.
    Disconnected,
}

/// Failure reported by an external provider, with the provider's own detail.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No wallet could be reached.
    #[error("{0}")]
    Unavailable(String),
    /// The wallet or node refused the request.
    #[error("{0}")]
    Rejected(String),
    /// Anything else: transport failures, malformed responses, timeouts.
    #[error("{0}")]
    Failed(String),
}

impl From<RpcError<TransportErrorKind>> for ProviderError {
    /// JSON-RPC error responses are refusals by the node, everything else is a failure to talk
    /// to it.
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match err.as_error_resp() {
            Some(payload) => Self::Rejected(payload.message.to_string()),
            None => Self::Failed(err.to_string()),
        }
    }
}

/// An EIP-1193 style wallet provider.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait WalletProvider: Send + Sync {
    /// Requests access to the wallet and returns the selected account.
    async fn enable(&self) -> Result<Address, ProviderError>;

    /// Returns the current chain id as a hex string, e.g. `0x45c`.
    async fn chain_id(&self) -> Result<String, ProviderError>;

    /// Subscribes to account and chain change notifications.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Signs and submits transactions.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait TransactionSender: Send + Sync {
    /// Signs and submits `tx`, returning its hash once the provider accepted it.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError>;
}

/// Executes read-only contract calls.
#[async_trait]
#[auto_impl(&, Box, Arc)]
pub trait ContractReader: Send + Sync {
    /// Executes `tx` as an `eth_call` and returns the raw return data.
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError>;
}
