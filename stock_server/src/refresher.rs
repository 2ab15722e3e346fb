//! Periodic price refresher.
//!
//! The `PriceRefresher` simulates live market data: on every tick it snapshots all
//! stored records and overwrites each record's price with a uniformly random value
//! in `[0, 100)`. Each record gets its own independent update-by-identity; the
//! updates of one tick run concurrently and in no particular order.
//!
//! Tick model:
//! - A tick is awaitable as a unit. [`PriceRefresher::tick`] returns only once every
//!   update of its batch has settled, and reports what happened in a [`TickReport`].
//! - Ticks never overlap. The run loop awaits each tick and then restarts the
//!   interval, so the next tick fires one full interval after the previous one
//!   finished. Firings that fall inside a slow batch are dropped rather than
//!   delivered back-to-back.
//! - Nothing is coordinated with HTTP traffic. A record deleted between snapshot and
//!   update is counted as vanished; a concurrent write and a refresh race and the last
//!   one wins.
//!
//! Failures are best-effort: a failed update is logged and counted, a failed snapshot
//! yields an empty tick, and the loop keeps running either way.

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, error, info, warn};
use rand::Rng;
use stock_common::stock::StockUpdate;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::store::{StockFilter, StockStore};

/// Range refreshed prices are drawn from.
pub const PRICE_RANGE: Range<f64> = 0.0..100.0;

/// Outcome of one refresh tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Records in the snapshot the tick worked from.
    pub snapshot: usize,
    /// Records whose price was overwritten.
    pub updated: usize,
    /// Records that disappeared between snapshot and update.
    pub vanished: usize,
    /// Updates (or the snapshot itself) that failed.
    pub failed: usize,
    /// When the last update of the batch settled.
    pub finished_at: DateTime<Utc>,
}

impl TickReport {
    fn empty(failed: usize) -> Self {
        TickReport {
            snapshot: 0,
            updated: 0,
            vanished: 0,
            failed,
            finished_at: Utc::now(),
        }
    }
}

/// Background job that randomizes every stored price on a fixed cadence.
pub struct PriceRefresher {
    store: Arc<dyn StockStore>,
    interval: Duration,
}

impl PriceRefresher {
    /// Create a refresher over `store` firing every `interval`.
    pub fn new(store: Arc<dyn StockStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Draw a fresh price from [`PRICE_RANGE`].
    pub fn next_price() -> f64 {
        rand::rng().random_range(PRICE_RANGE)
    }

    /// Run one refresh tick and wait for all of its updates to settle.
    pub async fn tick(&self) -> TickReport {
        let snapshot = match self.store.find(&StockFilter::All).await {
            Ok(records) => records,
            Err(e) => {
                error!("Refresh snapshot failed: {}", e);
                return TickReport::empty(1);
            }
        };

        let updates = snapshot.iter().map(|record| {
            let store = Arc::clone(&self.store);
            let id = record.id;
            let price = Self::next_price();
            async move { (id, store.update_by_id(id, StockUpdate::price(price)).await) }
        });
        let results = join_all(updates).await;

        let mut report = TickReport::empty(0);
        report.snapshot = snapshot.len();
        for (id, result) in results {
            match result {
                Ok(Some(_)) => report.updated += 1,
                Ok(None) => {
                    debug!("Stock {} vanished before its price was refreshed", id);
                    report.vanished += 1;
                }
                Err(e) => {
                    error!("Error updating stock {}: {}", id, e);
                    report.failed += 1;
                }
            }
        }
        report.finished_at = Utc::now();
        report
    }

    /// Tick every interval until `shutdown` changes or its sender is dropped.
    ///
    /// The first tick fires one full interval after the call, and every later tick
    /// one full interval after the previous tick settled.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Price refresher started, interval {:?}", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.tick().await;
                    ticker.reset();
                    if report.failed > 0 {
                        warn!(
                            "Refresh tick at {} finished with {} failed of {} records",
                            report.finished_at, report.failed, report.snapshot
                        );
                    } else {
                        debug!(
                            "Refresh tick at {}: {} updated, {} vanished",
                            report.finished_at, report.updated, report.vanished
                        );
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        info!("Price refresher stopping...");
    }

    /// Spawn [`Self::run`] on the tokio runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
