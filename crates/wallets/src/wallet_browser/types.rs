use alloy_primitives::{Address, TxHash};
use alloy_rpc_types::TransactionRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The account and chain the browser wallet currently exposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub address: Address,
    /// Hex chain id exactly as reported by `eth_chainId`.
    pub chain_id: String,
}

impl Connection {
    pub fn new(address: Address, chain_id: impl Into<String>) -> Self {
        Self { address, chain_id: chain_id.into() }
    }
}

/// Sent by the page on `chainChanged`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainUpdate {
    pub chain_id: String,
}

/// Sent by the page when no injected wallet exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailableReport {
    pub message: String,
}

/// A transaction waiting to be signed and sent by the browser wallet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrowserTransaction {
    /// Unique ID for tracking in the browser
    pub id: Uuid,
    #[serde(flatten)]
    pub request: TransactionRequest,
}

/// The browser wallet's answer to a [`BrowserTransaction`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub hash: Option<TxHash>,
    pub error: Option<String>,
}

/// Envelope of every `/api` response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum BrowserApiResponse<T = ()> {
    Ok(T),
    Error { message: String },
}

impl BrowserApiResponse {
    pub fn ok() -> Self {
        Self::Ok(())
    }
}

impl<T> BrowserApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}
