//! The running stock service.
//!
//! `StockService` owns everything that used to be process-global: the record store
//! handle and the price refresher task together with its shutdown channel. The HTTP
//! API receives the store through [`StockService::router`] instead of reaching for a
//! shared connection, so tests can stand up as many isolated services as they like.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{self, AppState};
use crate::error::ServerError;
use crate::refresher::PriceRefresher;
use crate::store::StockStore;

/// Store handle plus the background refresher running against it.
pub struct StockService {
    store: Arc<dyn StockStore>,
    shutdown_tx: watch::Sender<bool>,
    refresher: JoinHandle<()>,
}

impl StockService {
    /// Start the price refresher over `store` and return the running service.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(store: Arc<dyn StockStore>, refresh_interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let refresher =
            PriceRefresher::new(Arc::clone(&store), refresh_interval).spawn(shutdown_rx);
        Self {
            store,
            shutdown_tx,
            refresher,
        }
    }

    /// Handle to the record store the service runs against.
    pub fn store(&self) -> Arc<dyn StockStore> {
        Arc::clone(&self.store)
    }

    /// HTTP router bound to this service's store.
    pub fn router(&self) -> Router {
        api::router(AppState::new(self.store()))
    }

    /// Serve the API on `listener` until `signal` resolves, then stop the refresher.
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Server is running on {}", listener.local_addr()?);
        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await;
        self.shutdown().await;
        Ok(served?)
    }

    /// Stop the refresher and wait for its current tick to finish.
    pub async fn shutdown(self) {
        // Receiver gone means the refresher already exited.
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.refresher.await {
            error!("Price refresher task failed: {}", e);
        }
        info!("Stock service stopped");
    }
}
