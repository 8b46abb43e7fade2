//! # portal-cli
//!
//! The `portal` command line: connect a wallet, mint level rewards, list owned tokens and manage
//! local progress.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod args;
pub mod cmd;
pub mod handler;
pub mod utils;
