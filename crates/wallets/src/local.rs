//! Signing with a private key held by this process.

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, ChainId, TxHash};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::{
    error::WalletSignerError,
    provider::{EVENT_CAPACITY, ProviderError, ProviderEvent, TransactionSender, WalletProvider},
    utils::{create_private_key_signer, parse_rpc_url},
};

/// A wallet backed by a raw private key and a JSON-RPC endpoint.
///
/// The account and chain are fixed for the lifetime of the provider, so no change events are
/// ever emitted. Only meant for development and testing.
#[derive(Clone)]
pub struct LocalSignerProvider {
    address: Address,
    chain_id: ChainId,
    provider: DynProvider,
    events: broadcast::Sender<ProviderEvent>,
}

impl LocalSignerProvider {
    /// Creates a signer for `private_key` that submits to `rpc_url` on `chain_id`.
    pub fn new(
        rpc_url: &str,
        private_key: &str,
        chain_id: ChainId,
    ) -> Result<Self, WalletSignerError> {
        let signer = create_private_key_signer(private_key)?;
        Self::from_signer(signer, rpc_url, chain_id)
    }

    /// Creates a provider around an existing signer.
    pub fn from_signer(
        signer: PrivateKeySigner,
        rpc_url: &str,
        chain_id: ChainId,
    ) -> Result<Self, WalletSignerError> {
        let url = parse_rpc_url(rpc_url)?;
        let signer = signer.with_chain_id(Some(chain_id));
        let address = signer.address();
        let provider =
            ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_http(url).erased();
        trace!(%address, chain_id, "created local signer");
        Ok(Self { address, chain_id, provider, events: broadcast::channel(EVENT_CAPACITY).0 })
    }

    /// The signer's address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The declared chain id.
    pub fn declared_chain_id(&self) -> ChainId {
        self.chain_id
    }
}

impl std::fmt::Debug for LocalSignerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSignerProvider")
            .field("address", &self.address)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WalletProvider for LocalSignerProvider {
    async fn enable(&self) -> Result<Address, ProviderError> {
        Ok(self.address)
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        Ok(format!("{:#x}", self.chain_id))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl TransactionSender for LocalSignerProvider {
    async fn send_transaction(&self, mut tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        tx.from.get_or_insert(self.address);
        tx.chain_id.get_or_insert(self.chain_id);
        let pending = self.provider.send_transaction(tx).await?;
        let hash = *pending.tx_hash();
        debug!(%hash, "submitted transaction");
        Ok(hash)
    }
}
