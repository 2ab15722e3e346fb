//! Errors that stop the server binary.
//!
//! Request-level failures never reach this type; they are turned into HTTP
//! responses by `api::ApiError`. `ServerError` covers what can go wrong before
//! or around serving: configuration, opening the store and the listener.

use std::io;

use stock_common::StockError;
use thiserror::Error;

use crate::store::StoreError;

/// Startup and serving failures.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration could not be read or is invalid.
    #[error("Configuration failed: {0}")]
    Config(#[from] StockError),

    /// The record store could not be opened.
    #[error("Record store unavailable: {0}")]
    Store(#[from] StoreError),

    /// Binding or serving the HTTP listener failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
