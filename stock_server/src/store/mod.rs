//! Record store: where stock records live.
//!
//! The [`StockStore`] trait is the only thing the HTTP handlers and the price
//! refresher see. Two backends implement it:
//!
//! - [`MemoryStore`] — a process-local `Vec` behind an async `RwLock`, iterated in
//!   insertion order. Used by tests and by `--store memory`.
//! - [`PgStore`] — a PostgreSQL table reached through one shared
//!   `tokio_postgres::Client`.
//!
//! Absence is not an error: lookups, updates and deletes that match nothing
//! return `Ok(None)`. No operation is transactional and symbols are not unique.

use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use stock_common::stock::{NewStock, StockUpdate};
use stock_common::{StockId, StockRecord};
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failure talking to or executing against a backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error reported by the PostgreSQL client or server.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A stored row could not be mapped back into a `StockRecord`.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Selects the records an operation applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum StockFilter {
    /// Every record.
    All,
    /// Records whose symbol equals the given one exactly.
    Symbol(String),
    /// The record with this identity.
    Id(StockId),
}

impl StockFilter {
    /// In-memory evaluation of the filter.
    pub fn matches(&self, record: &StockRecord) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Symbol(symbol) => record.symbol == *symbol,
            StockFilter::Id(id) => record.id == *id,
        }
    }
}

/// Async CRUD contract shared by every backend.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// All matching records, in backend iteration order (not guaranteed stable).
    async fn find(&self, filter: &StockFilter) -> Result<Vec<StockRecord>, StoreError>;

    /// First matching record, if any.
    async fn find_one(&self, filter: &StockFilter) -> Result<Option<StockRecord>, StoreError>;

    /// Store `stock` under a fresh identity and return the stored record.
    async fn insert(&self, stock: NewStock) -> Result<StockRecord, StoreError>;

    /// Overwrite the fields present in `update` on the record with identity `id`.
    async fn update_by_id(
        &self,
        id: StockId,
        update: StockUpdate,
    ) -> Result<Option<StockRecord>, StoreError>;

    /// Remove the first matching record and return it.
    async fn delete_one(&self, filter: &StockFilter) -> Result<Option<StockRecord>, StoreError>;
}

/// Which backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    /// Volatile in-process store.
    Memory,
    /// PostgreSQL-backed persistent store.
    Postgres,
}

/// Open the configured backend.
pub async fn open(
    backend: StoreBackend,
    database_url: &str,
) -> Result<Arc<dyn StockStore>, StoreError> {
    match backend {
        StoreBackend::Memory => {
            info!("Using in-memory record store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PgStore::connect(database_url).await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert_eq!("Postgres".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
        assert!("mongo".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::Postgres.to_string(), "postgres");
    }

    #[test]
    fn filter_matches_exact_symbol_only() {
        let record = StockRecord::create(NewStock {
            symbol: "ACME".into(),
            name: "Acme Corp".into(),
            price: 10.0,
        });
        assert!(StockFilter::All.matches(&record));
        assert!(StockFilter::Symbol("ACME".into()).matches(&record));
        assert!(!StockFilter::Symbol("acme".into()).matches(&record));
        assert!(StockFilter::Id(record.id).matches(&record));
        assert!(!StockFilter::Id(StockId::new()).matches(&record));
    }
}
