use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BrowserWalletError {
    #[error("failed to start browser wallet bridge: {0}")]
    Server(#[from] std::io::Error),
    #[error("browser wallet bridge is not running")]
    NotRunning,
    #[error("{operation} request was rejected: {reason}")]
    Rejected { operation: &'static str, reason: String },
    #[error("{operation} request timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },
    #[error("no browser wallet available: {0}")]
    Unavailable(String),
    #[error("browser wallet is not connected")]
    NotConnected,
}
