//! Core of the provider-agnostic chat gateway.
//!
//! This crate is intentionally framework-agnostic. Telegram / MAX network clients
//! live behind capability traits implemented in adapter crates; the HTTP host
//! lives in the `msgw` binary.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod registry;
pub mod webhook;

pub use errors::{Error, Result};
