//! Error types used across the Stock Client.
//!
//! The `ClientError` enum unifies transport, server-reported and URL errors so that
//! they can be propagated easily with `Result<T, ClientError>`.
use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for the application.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Request could not be sent or its body could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Server {
        /// Response status.
        status: StatusCode,
        /// The `error` field of the response body, or the raw body.
        message: String,
    },

    /// Server URL cannot be used as a base for API paths.
    #[error("Format error: {0}")]
    Format(String),
}
