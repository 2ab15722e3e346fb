//!
//! Common types and utilities shared by the stock server and client.
//!
//! This crate aggregates:
//! - `error` — unified error type `StockError` used across the workspace.
//! - `result` — handy `Result<T, StockError>` alias.
//! - `stock` — stock records and the JSON bodies exchanged over HTTP.
//! - `net` — route paths, default port and other connection defaults.
#![warn(missing_docs)]
pub mod error;
pub mod net;
pub mod result;
pub mod stock;

pub use error::StockError;
pub use result::Result;
pub use stock::{StockId, StockRecord};
