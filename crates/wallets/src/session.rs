//! The wallet session: which account and chain the game is talking to.

use alloy_primitives::{Address, ChainId};
use parking_lot::RwLock;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::broadcast::error::RecvError,
    task::JoinHandle,
    time::timeout,
};

use crate::{
    error::WalletError,
    provider::{ProviderError, ProviderEvent, WalletProvider},
};

/// Default time to wait for a wallet to connect.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(300);

/// A copy of the session fields taken under a single lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// The selected account, absent until a wallet connected.
    pub address: Option<Address>,
    /// The reported chain, `0` until the first report.
    pub chain_id: ChainId,
    /// Whether the provider handshake completed.
    pub initialized: bool,
}

impl SessionState {
    /// Returns true if an account is selected and the handshake completed.
    pub fn is_ready(&self) -> bool {
        self.address.is_some() && self.initialized
    }
}

/// Holds the connection state shared by everything that talks to the wallet.
///
/// A session is created once and handed to its consumers behind an [`Arc`]. Its fields are only
/// changed by the callback handlers below.
///
/// Readiness never reverts: a disconnect or an account change keeps the session ready with the
/// last reported account.
#[derive(Debug)]
pub struct WalletSession {
    state: RwLock<SessionState>,
    connect_timeout: Duration,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_TIMEOUT)
    }
}

impl WalletSession {
    /// Creates an unconnected session.
    pub fn new(connect_timeout: Duration) -> Self {
        Self { state: RwLock::new(SessionState::default()), connect_timeout }
    }

    /// Runs the provider handshake and records the selected account.
    ///
    /// The first successful handshake marks the session initialized and fetches the chain id
    /// once; later chain changes arrive through [`watch`](Self::watch).
    pub async fn connect<P>(&self, provider: &P) -> Result<Address, WalletError>
    where
        P: WalletProvider + ?Sized,
    {
        debug!("enabling wallet provider");
        let address = match timeout(self.connect_timeout, provider.enable()).await {
            Ok(Ok(address)) => address,
            Ok(Err(err)) => {
                warn!(%err, "wallet provider could not be enabled");
                return Err(match err {
                    ProviderError::Unavailable(msg)
                    | ProviderError::Rejected(msg)
                    | ProviderError::Failed(msg) => WalletError::ProviderUnavailable(msg),
                });
            }
            Err(_) => {
                warn!(after = ?self.connect_timeout, "wallet connection timed out");
                return Err(WalletError::Timeout {
                    operation: "wallet connection",
                    after: self.connect_timeout,
                });
            }
        };

        if self.mark_initialized() {
            match timeout(self.connect_timeout, provider.chain_id()).await {
                Ok(Ok(chain_id)) => {
                    if let Err(err) = self.on_chain_changed(&chain_id) {
                        warn!(%err, "provider reported an unusable chain id");
                    }
                }
                Ok(Err(err)) => warn!(%err, "failed to fetch chain id"),
                Err(_) => warn!("timed out fetching chain id"),
            }
        }

        self.on_account_changed(address);
        info!(%address, "wallet connected");
        Ok(address)
    }

    /// Applies provider events to this session until the provider's event stream closes.
    ///
    /// Abort the returned handle to stop watching.
    pub fn watch<P>(self: &Arc<Self>, provider: &P) -> JoinHandle<()>
    where
        P: WalletProvider + ?Sized,
    {
        let mut events = provider.subscribe();
        let session = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => session.apply(event),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "wallet event receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("wallet event stream closed");
        })
    }

    /// Applies a single provider event.
    pub fn apply(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(address) => self.on_account_changed(address),
            ProviderEvent::ChainChanged(chain_id) => {
                if let Err(err) = self.on_chain_changed(&chain_id) {
                    warn!(%err, "ignoring chain change");
                }
            }
            ProviderEvent::Disconnected => {
                info!("wallet disconnected, keeping the last selected account");
            }
        }
    }

    /// Records the selected account.
    pub fn on_account_changed(&self, address: Address) {
        let mut state = self.state.write();
        if state.address != Some(address) {
            debug!(%address, "account changed");
        }
        state.address = Some(address);
    }

    /// Records the chain id reported by the provider as a hex string.
    ///
    /// The current chain id is kept if `chain_id` cannot be parsed.
    pub fn on_chain_changed(&self, chain_id: &str) -> Result<ChainId, WalletError> {
        let parsed = parse_chain_id(chain_id)?;
        self.state.write().chain_id = parsed;
        debug!(chain_id = parsed, "chain changed");
        Ok(parsed)
    }

    /// Returns true if an account is selected and the handshake completed.
    pub fn is_ready(&self) -> bool {
        self.state.read().is_ready()
    }

    /// The selected account.
    pub fn address(&self) -> Option<Address> {
        self.state.read().address
    }

    /// The last reported chain id.
    pub fn chain_id(&self) -> ChainId {
        self.state.read().chain_id
    }

    /// Whether the provider handshake completed.
    pub fn is_initialized(&self) -> bool {
        self.state.read().initialized
    }

    /// Returns all fields at once.
    pub fn snapshot(&self) -> SessionState {
        *self.state.read()
    }

    /// Marks the handshake as completed, returning true if it was not before.
    pub(crate) fn mark_initialized(&self) -> bool {
        let mut state = self.state.write();
        !std::mem::replace(&mut state.initialized, true)
    }
}

/// Parses a hex chain id such as `0x45c`. The `0x` prefix is optional.
pub fn parse_chain_id(s: &str) -> Result<ChainId, WalletError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(WalletError::MalformedChainId(s.to_string()));
    }
    ChainId::from_str_radix(digits, 16).map_err(|_| WalletError::MalformedChainId(s.to_string()))
}
