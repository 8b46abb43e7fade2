//! Submits mints and owned token queries on behalf of the connected player.

use std::{future::Future, sync::Arc, time::Duration};

use alloy_primitives::{Address, TxHash, TxKind, U256};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use portal_wallets::{ContractReader, ProviderError, TransactionSender, WalletError, WalletSession};
use serde::Serialize;

use crate::{contract::IPortalNft, request::MintRequest};

/// Default bound on a single provider request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Token ids owned by a player, in the order the contract returned them.
///
/// An empty list is a successful answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NftQueryResult {
    pub token_ids: Vec<U256>,
}

/// Mints level rewards and reads owned tokens against a fixed contract.
///
/// Transactions go through `S`, view calls through `R`. A client built with `S = ()` can only
/// query. Nothing prevents two concurrent [`mint`](Self::mint) calls from submitting two
/// transactions.
#[derive(Debug)]
pub struct MintClient<S, R> {
    session: Arc<WalletSession>,
    sender: S,
    reader: R,
    contract: Address,
    timeout: Duration,
}

impl<S, R> MintClient<S, R> {
    pub fn new(session: Arc<WalletSession>, sender: S, reader: R, contract: Address) -> Self {
        Self { session, sender, reader, contract, timeout: DEFAULT_REQUEST_TIMEOUT }
    }

    /// Sets how long a single provider request may take.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Runs `fut` under the request timeout, describing the timeout on expiry.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = T>,
    ) -> Result<T, String> {
        tokio::time::timeout(self.timeout, fut).await.map_err(|_| {
            warn!(operation, after = ?self.timeout, "provider request timed out");
            format!("{operation} timed out after {:?}", self.timeout)
        })
    }
}

impl<S: TransactionSender, R> MintClient<S, R> {
    /// Mints the reward for `level_id` to the session's account.
    ///
    /// Nothing is sent unless the session is ready and `level_id` parses. The transaction is
    /// submitted exactly once; the returned hash means the wallet accepted it, not that it was
    /// mined.
    pub async fn mint(&self, level_id: &str, metadata_uri: &str) -> Result<TxHash, WalletError> {
        let state = self.session.snapshot();
        let Some(player) = state.address.filter(|_| state.is_ready()) else {
            warn!("mint requested before a wallet was connected");
            return Err(WalletError::SessionNotReady);
        };

        let request = MintRequest::new(player, level_id, metadata_uri).inspect_err(|err| {
            warn!(%err, "refusing to mint");
        })?;
        debug!(%player, level_id = %request.level_id, "submitting mint");

        let tx = request.to_transaction(self.contract);
        let result = self
            .bounded("mint", self.sender.send_transaction(tx))
            .await
            .map_err(WalletError::TransactionFailed)?;
        match result {
            Ok(hash) => {
                info!(%hash, level_id = %request.level_id, "mint submitted");
                Ok(hash)
            }
            Err(ProviderError::Rejected(reason)) => {
                warn!(%reason, "mint rejected");
                Err(WalletError::TransactionRejected(reason))
            }
            Err(ProviderError::Unavailable(reason) | ProviderError::Failed(reason)) => {
                error!(%reason, "mint failed");
                Err(WalletError::TransactionFailed(reason))
            }
        }
    }
}

impl<S, R: ContractReader> MintClient<S, R> {
    /// Lists the token ids `player` owns.
    pub async fn query_owned_tokens(&self, player: Address) -> Result<NftQueryResult, WalletError> {
        if player.is_zero() {
            return Err(WalletError::QueryFailed("player address is zero".to_string()));
        }

        let tx = TransactionRequest {
            to: Some(TxKind::Call(self.contract)),
            input: TransactionInput::new(
                IPortalNft::getNFTsOfPlayerCall { player }.abi_encode().into(),
            ),
            ..Default::default()
        };
        let raw = self
            .bounded("token query", self.reader.call(tx))
            .await
            .map_err(WalletError::QueryFailed)?
            .map_err(|err| {
                warn!(%err, %player, "token query failed");
                WalletError::QueryFailed(err.to_string())
            })?;

        let token_ids = IPortalNft::getNFTsOfPlayerCall::abi_decode_returns(&raw).map_err(|err| {
            warn!(%err, %player, "undecodable token query result");
            WalletError::QueryFailed(format!("invalid response: {err}"))
        })?;
        trace!(%player, count = token_ids.len(), "queried owned tokens");
        Ok(NftQueryResult { token_ids })
    }
}
