//! Error types shared between client and server.
//!
//! The `StockError` enum unifies common failure cases for I/O, configuration,
//! payload validation and identity parsing, allowing crates to propagate a
//! single error type.
use std::io;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum StockError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or contradictory configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Add-stock payload is missing a required field.
    #[error("Invalid stock data: {0}")]
    Validation(String),

    /// Text that should hold a stock identity is not a valid UUID.
    #[error("Invalid stock id: {0}")]
    InvalidId(#[from] uuid::Error),
}
