use alloy_primitives::Bytes;
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;

use crate::{
    error::WalletSignerError,
    provider::{ContractReader, ProviderError},
    utils::parse_rpc_url,
};

/// Executes view calls against a JSON-RPC endpoint. No signing is involved.
#[derive(Clone, Debug)]
pub struct RpcReader {
    provider: RootProvider,
}

impl RpcReader {
    /// Creates a reader for `rpc_url`.
    pub fn new(rpc_url: &str) -> Result<Self, WalletSignerError> {
        let url = parse_rpc_url(rpc_url)?;
        Ok(Self { provider: RootProvider::new_http(url) })
    }
}

#[async_trait]
impl ContractReader for RpcReader {
    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError> {
        trace!(to = ?tx.to, "eth_call");
        Ok(self.provider.call(tx).await?)
    }
}
