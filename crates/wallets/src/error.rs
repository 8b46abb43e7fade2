use alloy_primitives::hex::FromHexError;
use std::time::Duration;

use crate::wallet_browser::error::BrowserWalletError;

/// Errors surfaced by the wallet session and the mint client.
///
/// Every provider-facing operation returns one of these instead of a raw library error. All of
/// them are recoverable at the call site.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("wallet provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("malformed chain id {0:?}, expected a hex string")]
    MalformedChainId(String),
    #[error("wallet session is not ready, connect a wallet first")]
    SessionNotReady,
    #[error("invalid level id {value:?}: {reason}")]
    InvalidLevelId { value: String, reason: String },
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),
    #[error("transaction failed: {0}")]
    TransactionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    /// The connect handshake outlived the session's connect timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },
}

#[derive(Debug, thiserror::Error)]
pub enum PrivateKeyError {
    #[error("Failed to create wallet from private key. Private key is invalid hex: {0}")]
    InvalidHex(#[from] FromHexError),
    #[error(
        "Failed to create wallet from private key. Invalid private key. But env var {0} exists. Is the `$` anchor missing?"
    )]
    ExistsAsEnvVar(String),
    #[error("Failed to create wallet from private key: {0}")]
    Invalid(String),
}

/// Errors raised while building a wallet backend.
#[derive(Debug, thiserror::Error)]
pub enum WalletSignerError {
    #[error(transparent)]
    PrivateKey(#[from] PrivateKeyError),
    #[error(transparent)]
    Browser(#[from] BrowserWalletError),
    #[error("invalid RPC URL {url:?}: {source}")]
    InvalidRpcUrl { url: String, source: url::ParseError },
    #[error("no private key configured for the local signer, set `private_key` or PORTAL_PRIVATE_KEY")]
    MissingPrivateKey,
}
