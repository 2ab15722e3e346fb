//! Stock tracker HTTP server binary.
//!
//! Resolves the configuration, opens the record store, starts the price refresher
//! and serves the API until Ctrl+C.
use clap::Parser;
use log::{error, info};
use stock_server::config::{Args, ServerConfig};
use stock_server::error::ServerError;
use stock_server::service::StockService;
use stock_server::store;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    init_logger();
    let config = ServerConfig::load(Args::parse())?;
    info!(
        "Starting with {} store, refresh every {:?}",
        config.store, config.refresh_interval
    );

    let store = store::open(config.store, &config.database_url).await?;
    let service = StockService::start(store, config.refresh_interval);
    let listener = TcpListener::bind(config.bind_addr()).await?;
    service.serve(listener, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received. Shutting down server..."),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
