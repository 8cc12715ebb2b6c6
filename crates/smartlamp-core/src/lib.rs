//! Shared building blocks for the SmartLamp host driver.
//!
//! Holds the error taxonomy, the wire-level protocol constants and the
//! transaction configuration used by the protocol and hardware crates.

pub mod config;
pub mod constants;
pub mod error;

pub use config::TransactionConfig;
pub use error::{Error, Result};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
