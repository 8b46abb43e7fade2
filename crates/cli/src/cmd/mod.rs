//! Subcommands of the `portal` binary.

pub mod config;
pub mod connect;
pub mod mint;
pub mod nfts;
pub mod progress;
