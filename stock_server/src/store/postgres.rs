//! PostgreSQL-backed record store.
//!
//! One `tokio_postgres::Client` is shared by every request and by the price
//! refresher; the client pipelines concurrent queries over its single connection.
//! The connection future itself runs on a spawned task, which logs and exits if the
//! connection drops.
//!
//! Rows carry a `seq` column filled on insert, and every lookup orders by it, so
//! "first match" means the earliest inserted record, the same as the memory store.

use async_trait::async_trait;
use log::{error, info};
use stock_common::net::DATABASE_NAME;
use stock_common::stock::{NewStock, StockUpdate};
use stock_common::{StockId, StockRecord};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};
use uuid::Uuid;

use super::{StockFilter, StockStore, StoreError};

const COLUMNS: &str = "id, symbol, name, price";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS stocks (
        id      UUID PRIMARY KEY,
        seq     BIGSERIAL,
        symbol  VARCHAR NOT NULL,
        name    VARCHAR NOT NULL,
        price   DOUBLE PRECISION NOT NULL
    );
    ALTER TABLE stocks ADD COLUMN IF NOT EXISTS seq BIGSERIAL;
    CREATE INDEX IF NOT EXISTS stocks_symbol_idx ON stocks (symbol);
";

/// Store over the `stocks` table of the `stock_tracker` database.
pub struct PgStore {
    client: Client,
}

impl PgStore {
    /// Connect to `database_url` and make sure the table exists.
    ///
    /// The database name in the URL is ignored; the store always uses
    /// [`DATABASE_NAME`].
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let mut config: tokio_postgres::Config = database_url.parse()?;
        config.dbname(DATABASE_NAME);

        let (client, connection) = config.connect(NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection failed: {}", e);
            }
        });
        info!("Connected to PostgreSQL database {}", DATABASE_NAME);

        client.batch_execute(SCHEMA).await?;
        Ok(Self { client })
    }
}

/// `WHERE` clause and its parameters for a filter.
fn filter_clause(filter: &StockFilter) -> (&'static str, Vec<&(dyn ToSql + Sync)>) {
    match filter {
        StockFilter::All => ("", vec![]),
        StockFilter::Symbol(symbol) => {
            (" WHERE symbol = $1", vec![symbol as &(dyn ToSql + Sync)])
        }
        StockFilter::Id(id) => (" WHERE id = $1", vec![id.as_uuid() as &(dyn ToSql + Sync)]),
    }
}

fn record_from_row(row: &Row) -> Result<StockRecord, StoreError> {
    let corrupt = |e: tokio_postgres::Error| StoreError::Corrupt(e.to_string());
    let id: Uuid = row.try_get("id").map_err(corrupt)?;
    Ok(StockRecord {
        id: StockId::from(id),
        symbol: row.try_get("symbol").map_err(corrupt)?,
        name: row.try_get("name").map_err(corrupt)?,
        price: row.try_get("price").map_err(corrupt)?,
    })
}

#[async_trait]
impl StockStore for PgStore {
    async fn find(&self, filter: &StockFilter) -> Result<Vec<StockRecord>, StoreError> {
        let (clause, params) = filter_clause(filter);
        let sql = format!("SELECT {COLUMNS} FROM stocks{clause} ORDER BY seq");
        let rows = self.client.query(&sql, &params).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn find_one(&self, filter: &StockFilter) -> Result<Option<StockRecord>, StoreError> {
        let (clause, params) = filter_clause(filter);
        let sql = format!("SELECT {COLUMNS} FROM stocks{clause} ORDER BY seq LIMIT 1");
        let row = self.client.query_opt(&sql, &params).await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn insert(&self, stock: NewStock) -> Result<StockRecord, StoreError> {
        let sql = format!(
            "INSERT INTO stocks ({COLUMNS}) VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let id = StockId::new();
        let row = self
            .client
            .query_one(
                &sql,
                &[id.as_uuid(), &stock.symbol, &stock.name, &stock.price],
            )
            .await?;
        record_from_row(&row)
    }

    async fn update_by_id(
        &self,
        id: StockId,
        update: StockUpdate,
    ) -> Result<Option<StockRecord>, StoreError> {
        let sql = format!(
            "UPDATE stocks SET symbol = COALESCE($2, symbol), name = COALESCE($3, name), \
             price = COALESCE($4, price) WHERE id = $1 RETURNING {COLUMNS}"
        );
        let row = self
            .client
            .query_opt(
                &sql,
                &[id.as_uuid(), &update.symbol, &update.name, &update.price],
            )
            .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete_one(&self, filter: &StockFilter) -> Result<Option<StockRecord>, StoreError> {
        let (clause, params) = filter_clause(filter);
        let sql = format!(
            "DELETE FROM stocks \
             WHERE id = (SELECT id FROM stocks{clause} ORDER BY seq LIMIT 1) \
             RETURNING {COLUMNS}"
        );
        let row = self.client.query_opt(&sql, &params).await?;
        row.as_ref().map(record_from_row).transpose()
    }
}
