//! # portal-wallets
//!
//! Wallet connectivity for the portal minting client: the session state machine, the browser
//! wallet bridge and a local private key signer.

#[macro_use]
extern crate tracing;

pub mod backend;
pub mod error;
pub mod local;
pub mod provider;
pub mod rpc;
pub mod session;
pub mod utils;
pub mod wallet_browser;

pub use backend::WalletBackend;
pub use error::{PrivateKeyError, WalletError, WalletSignerError};
pub use local::LocalSignerProvider;
pub use provider::{ContractReader, ProviderError, ProviderEvent, TransactionSender, WalletProvider};
pub use rpc::RpcReader;
pub use session::{SessionState, WalletSession, parse_chain_id};
pub use wallet_browser::{provider::BrowserProvider, server::BrowserWalletServer};
