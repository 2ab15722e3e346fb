//! Stock tracker server.
//!
//! A small record-keeping service for stock tickers: it stores symbol/name/price
//! triples, exposes them over a JSON HTTP API and keeps overwriting the stored
//! prices with random values to simulate a live market. The pieces are:
//!
//! - `store` — the async `StockStore` contract with an in-memory and a PostgreSQL
//!   backend.
//! - `refresher` — the `PriceRefresher` that randomizes every price on a fixed
//!   cadence, one awaitable batch per tick.
//! - `api` — the axum router translating REST calls into store calls.
//! - `service` — `StockService`, owner of the store handle and the refresher task.
//! - `config` — CLI/env/TOML configuration.
//! - `error` — `ServerError`, the failures that stop the binary.
//!
//! Concurrency: the HTTP handlers and the refresher run as independent tokio tasks
//! against the same store with no coordination between them. Within a tick the
//! per-record updates run concurrently; ticks themselves never overlap.
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod refresher;
pub mod service;
pub mod store;
