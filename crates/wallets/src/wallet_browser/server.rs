use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use alloy_primitives::TxHash;
use parking_lot::Mutex;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use uuid::Uuid;

use crate::{
    provider::ProviderEvent,
    wallet_browser::{
        error::BrowserWalletError,
        router::build_router,
        state::BrowserWalletState,
        types::{BrowserTransaction, Connection, TransactionResponse},
    },
};

/// How often pending requests are checked for an answer.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Local HTTP server bridging this process and a wallet injected into a browser page.
///
/// The page connects to `window.ethereum`, reports the selected account and chain, and polls for
/// transactions to sign and send. Clones share the same state and server.
#[derive(Debug, Clone)]
pub struct BrowserWalletServer {
    port: u16,
    timeout: Duration,
    state: Arc<BrowserWalletState>,
    shutdown: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl BrowserWalletServer {
    /// Create a server for `port` (`0` picks a free port once started) where every request to
    /// the browser waits at most `timeout`.
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self {
            port,
            timeout,
            state: Arc::new(BrowserWalletState::new()),
            shutdown: Arc::new(Mutex::new(None)),
            task: Arc::new(Mutex::new(None)),
        }
    }

    /// Binds to `127.0.0.1:<port>` and starts serving in the background.
    pub async fn start(&mut self) -> Result<(), BrowserWalletError> {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, self.port))).await?;
        self.port = listener.local_addr()?.port();

        let (tx, rx) = oneshot::channel();
        let router = build_router(self.state.clone());
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = rx.await;
            });
            if let Err(err) = server.await {
                error!(%err, "browser wallet bridge stopped");
            }
        });

        *self.shutdown.lock() = Some(tx);
        *self.task.lock() = Some(task);
        info!(url = %self.url(), "browser wallet bridge listening");
        Ok(())
    }

    /// Stops the server and waits for it to exit.
    pub async fn stop(&self) -> Result<(), BrowserWalletError> {
        let tx = self.shutdown.lock().take().ok_or(BrowserWalletError::NotRunning)?;
        let _ = tx.send(());
        let task = self.task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
        debug!("browser wallet bridge stopped");
        Ok(())
    }

    /// Whether [`start`](Self::start) was called and the server was not stopped since.
    pub fn is_running(&self) -> bool {
        self.shutdown.lock().is_some()
    }

    /// The port the server listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The page the user has to open.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// How long requests to the browser wait for an answer.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The token the page presents on every API call.
    pub fn session_token(&self) -> Arc<String> {
        self.state.session_token()
    }

    /// Check if a wallet is connected.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Get the current connection.
    pub fn get_connection(&self) -> Option<Connection> {
        self.state.get_connection()
    }

    /// Why the page could not reach a wallet, if it reported so.
    pub fn unavailable(&self) -> Option<String> {
        self.state.unavailable()
    }

    /// Subscribe to account and chain changes reported by the page.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ProviderEvent> {
        self.state.subscribe()
    }

    /// Waits until the page reports a connection or reports that no wallet exists.
    ///
    /// Does not time out on its own, callers bound it, e.g.
    /// [`WalletSession::connect`](crate::session::WalletSession::connect).
    pub async fn wait_for_connection(&self) -> Result<Connection, BrowserWalletError> {
        loop {
            if !self.is_running() {
                return Err(BrowserWalletError::NotRunning);
            }
            if let Some(connection) = self.get_connection() {
                return Ok(connection);
            }
            if let Some(message) = self.unavailable() {
                return Err(BrowserWalletError::Unavailable(message));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Queues `request` for the browser and waits for the wallet's answer.
    ///
    /// The request is withdrawn if no answer arrives in time or the returned future is dropped.
    pub async fn request_transaction(
        &self,
        request: BrowserTransaction,
    ) -> Result<TxHash, BrowserWalletError> {
        if !self.is_running() {
            return Err(BrowserWalletError::NotRunning);
        }
        if !self.is_connected() {
            return Err(BrowserWalletError::NotConnected);
        }

        let id = request.id;
        self.state.add_transaction_request(request);
        debug!(%id, "queued transaction for the browser wallet");
        let _pending = PendingTransaction { state: &self.state, id };

        let start = Instant::now();
        loop {
            if let Some(response) = self.state.get_transaction_response(&id) {
                return into_hash(response);
            }

            if start.elapsed() > self.timeout {
                // the page may have answered since the last poll
                if let Some(response) = self.state.withdraw_transaction(&id) {
                    return into_hash(response);
                }
                return Err(BrowserWalletError::Timeout {
                    operation: "Transaction",
                    after: self.timeout,
                });
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Withdraws a queued transaction once nobody waits for it anymore, including when the waiting
/// future is dropped.
struct PendingTransaction<'a> {
    state: &'a BrowserWalletState,
    id: Uuid,
}

impl Drop for PendingTransaction<'_> {
    fn drop(&mut self) {
        if let Some(response) = self.state.withdraw_transaction(&self.id) {
            warn!(
                id = %self.id,
                hash = ?response.hash,
                error = ?response.error,
                "browser wallet answered a transaction nobody waits for anymore"
            );
        }
    }
}

fn into_hash(response: TransactionResponse) -> Result<TxHash, BrowserWalletError> {
    match (response.hash, response.error) {
        (_, Some(reason)) => Err(BrowserWalletError::Rejected { operation: "Transaction", reason }),
        (Some(hash), None) => Ok(hash),
        (None, None) => Err(BrowserWalletError::Rejected {
            operation: "Transaction",
            reason: "wallet returned neither a hash nor an error".to_string(),
        }),
    }
}
