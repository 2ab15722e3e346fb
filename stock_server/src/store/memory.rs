//! In-process record store.
//!
//! Records sit in a `Vec` behind a `tokio::sync::RwLock`, so iteration order is
//! insertion order and deletes shift later records forward. The lock is held only
//! for the duration of a single operation; there is no cross-operation locking.

use async_trait::async_trait;
use stock_common::stock::{NewStock, StockUpdate};
use stock_common::{StockId, StockRecord};
use tokio::sync::RwLock;

use super::{StockFilter, StockStore, StoreError};

/// Volatile store backed by a vector of records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<StockRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StockStore for MemoryStore {
    async fn find(&self, filter: &StockFilter) -> Result<Vec<StockRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn find_one(&self, filter: &StockFilter) -> Result<Option<StockRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| filter.matches(r)).cloned())
    }

    async fn insert(&self, stock: NewStock) -> Result<StockRecord, StoreError> {
        let record = StockRecord::create(stock);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_by_id(
        &self,
        id: StockId,
        update: StockUpdate,
    ) -> Result<Option<StockRecord>, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.iter_mut().find(|r| r.id == id).map(|record| {
            record.apply(&update);
            record.clone()
        }))
    }

    async fn delete_one(&self, filter: &StockFilter) -> Result<Option<StockRecord>, StoreError> {
        let mut records = self.records.write().await;
        let position = records.iter().position(|r| filter.matches(r));
        Ok(position.map(|index| records.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(symbol: &str, name: &str, price: f64) -> NewStock {
        NewStock {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_is_findable() {
        let store = MemoryStore::new();
        let stored = store.insert(stock("ACME", "Acme Corp", 10.0)).await.unwrap();

        let found = store
            .find_one(&StockFilter::Symbol("ACME".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, stored);
        let by_id = store.find_one(&StockFilter::Id(stored.id)).await.unwrap();
        assert_eq!(by_id, Some(stored));
    }

    #[tokio::test]
    async fn find_keeps_insertion_order_and_duplicates() {
        let store = MemoryStore::new();
        store.insert(stock("AAA", "First", 1.0)).await.unwrap();
        store.insert(stock("BBB", "Second", 2.0)).await.unwrap();
        store.insert(stock("AAA", "Third", 3.0)).await.unwrap();

        let all = store.find(&StockFilter::All).await.unwrap();
        let names: Vec<_> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["First", "Second", "Third"]);

        let dupes = store.find(&StockFilter::Symbol("AAA".into())).await.unwrap();
        assert_eq!(dupes.len(), 2);
    }

    #[tokio::test]
    async fn update_by_id_overwrites_price_only() {
        let store = MemoryStore::new();
        let stored = store.insert(stock("ACME", "Acme Corp", 10.0)).await.unwrap();

        let updated = store
            .update_by_id(stored.id, StockUpdate::price(55.0))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, 55.0);
        assert_eq!(updated.symbol, "ACME");
        assert_eq!(updated.id, stored.id);
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_absent() {
        let store = MemoryStore::new();
        let result = store
            .update_by_id(StockId::new(), StockUpdate::price(1.0))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_one_removes_first_match_only() {
        let store = MemoryStore::new();
        let first = store.insert(stock("AAA", "First", 1.0)).await.unwrap();
        store.insert(stock("AAA", "Second", 2.0)).await.unwrap();

        let removed = store
            .delete_one(&StockFilter::Symbol("AAA".into()))
            .await
            .unwrap();
        assert_eq!(removed, Some(first));
        assert_eq!(store.len().await, 1);

        let missing = store
            .delete_one(&StockFilter::Symbol("ZZZ".into()))
            .await
            .unwrap();
        assert!(missing.is_none());
        assert_eq!(store.len().await, 1);
    }
}
