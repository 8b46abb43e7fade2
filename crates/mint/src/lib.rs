//! # portal-mint
//!
//! Mints level reward NFTs for the connected player and reads back what they own.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod contract;
pub mod progress;
pub mod request;

pub use client::{DEFAULT_REQUEST_TIMEOUT, MintClient, NftQueryResult};
pub use contract::IPortalNft;
pub use progress::{PlayerProgress, ProgressError};
pub use request::MintRequest;
