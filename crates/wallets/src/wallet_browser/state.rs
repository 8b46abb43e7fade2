use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    provider::{EVENT_CAPACITY, ProviderEvent},
    wallet_browser::{
        queue::RequestQueue,
        types::{BrowserTransaction, Connection, TransactionResponse},
    },
};

#[derive(Debug, Clone)]
pub(crate) struct BrowserWalletState {
    /// Current information about the wallet connection.
    connection: Arc<Mutex<Option<Connection>>>,
    /// Set when the page found no injected wallet.
    unavailable: Arc<Mutex<Option<String>>>,
    /// Request/response queue for transactions.
    transactions: Arc<Mutex<RequestQueue<BrowserTransaction, TransactionResponse>>>,
    /// Account and chain changes reported by the page.
    events: broadcast::Sender<ProviderEvent>,
    /// Token the page must present on every API call.
    session_token: Arc<String>,
}

impl Default for BrowserWalletState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserWalletState {
    /// Create a new browser wallet state.
    pub fn new() -> Self {
        Self {
            connection: Arc::new(Mutex::new(None)),
            unavailable: Arc::new(Mutex::new(None)),
            transactions: Arc::new(Mutex::new(RequestQueue::new())),
            events: broadcast::channel(EVENT_CAPACITY).0,
            session_token: Arc::new(Uuid::new_v4().simple().to_string()),
        }
    }

    /// The token expected in the `X-Session-Token` header.
    pub fn session_token(&self) -> Arc<String> {
        Arc::clone(&self.session_token)
    }

    /// Subscribe to account and chain changes.
    pub fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }

    /// Check if wallet is connected.
    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    /// Get current connection information.
    pub fn get_connection(&self) -> Option<Connection> {
        self.connection.lock().clone()
    }

    /// Set connection information, notifying subscribers of what changed.
    pub fn set_connection(&self, connection: Option<Connection>) {
        let previous = std::mem::replace(&mut *self.connection.lock(), connection.clone());
        match (previous, connection) {
            (_, None) => self.emit(ProviderEvent::Disconnected),
            (None, Some(new)) => {
                self.unavailable.lock().take();
                self.emit(ProviderEvent::AccountsChanged(new.address));
                self.emit(ProviderEvent::ChainChanged(new.chain_id));
            }
            (Some(old), Some(new)) => {
                if old.address != new.address {
                    self.emit(ProviderEvent::AccountsChanged(new.address));
                }
                if old.chain_id != new.chain_id {
                    self.emit(ProviderEvent::ChainChanged(new.chain_id));
                }
            }
        }
    }

    /// Record a chain change without touching the account.
    pub fn set_chain(&self, chain_id: String) {
        if let Some(connection) = self.connection.lock().as_mut() {
            connection.chain_id.clone_from(&chain_id);
        }
        self.emit(ProviderEvent::ChainChanged(chain_id));
    }

    /// Record that the page found no wallet to talk to.
    pub fn set_unavailable(&self, message: String) {
        *self.unavailable.lock() = Some(message);
    }

    /// Why the page could not reach a wallet, if it reported so.
    pub fn unavailable(&self) -> Option<String> {
        self.unavailable.lock().clone()
    }

    /// Add a transaction request.
    pub fn add_transaction_request(&self, request: BrowserTransaction) {
        self.transactions.lock().add_request(request);
    }

    /// Check if a transaction request exists.
    pub fn has_transaction_request(&self, id: &Uuid) -> bool {
        self.transactions.lock().has_request(id)
    }

    /// Read the next transaction request.
    pub fn read_next_transaction_request(&self) -> Option<BrowserTransaction> {
        self.transactions.lock().read_request().cloned()
    }

    /// Removes a transaction request, returning the response if the page answered it already.
    ///
    /// Both happen under one lock, so an answer is either returned here or refused as unknown.
    pub fn withdraw_transaction(&self, id: &Uuid) -> Option<TransactionResponse> {
        let mut transactions = self.transactions.lock();
        transactions.remove_request(id);
        transactions.get_response(id)
    }

    /// Add transaction response.
    pub fn add_transaction_response(&self, response: TransactionResponse) {
        let id = response.id;
        let mut transactions = self.transactions.lock();
        transactions.add_response(id, response);
        transactions.remove_request(&id);
    }

    /// Get transaction response, removing it from the queue.
    pub fn get_transaction_response(&self, id: &Uuid) -> Option<TransactionResponse> {
        self.transactions.lock().get_response(id)
    }

    fn emit(&self, event: ProviderEvent) {
        // no subscribers is fine, the connection itself is still recorded
        let _ = self.events.send(event);
    }
}
