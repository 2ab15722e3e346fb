//! Stock Client — a command-line client for the stock tracker HTTP API.
//!
//! Usage example (CLI):
//! ```bash
//! stock_client add --symbol ACME --name "Acme Corp" --price 10
//! stock_client price ACME
//! stock_client names
//! stock_client --server http://10.0.0.5:3001 delete ACME
//! ```
//!
//! Results are printed to stdout; failures are logged and end the process with a
//! non-zero exit code.
#![warn(missing_docs)]
mod api_client;
mod args;
mod error;
mod result;

use crate::api_client::StockApi;
use crate::args::{Args, Command};
use crate::error::ClientError;
use crate::result::Result;
use clap::Parser;
use log::{debug, error};
use stock_common::stock::AddStockRequest;

async fn run(api: &StockApi, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Price { symbol } => {
            let quote = api.price(&symbol).await?;
            println!("{} {:.2}", quote.symbol, quote.price);
        }
        Command::Names => {
            for stock in api.names().await? {
                println!("{}\t{}", stock.value, stock.label);
            }
        }
        Command::Add {
            symbol,
            name,
            price,
        } => {
            let record = api.add(&AddStockRequest::new(symbol, name, price)).await?;
            debug!("Stock stored with id {}", record.id);
            let pretty = serde_json::to_string_pretty(&record)
                .map_err(|e| ClientError::Format(e.to_string()))?;
            println!("{}", pretty);
        }
        Command::Delete { symbol } => {
            let body = api.delete(&symbol).await?;
            println!("{}", body.message);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    init_logger();
    let args = Args::parse();
    let api = StockApi::new(args.server.trim())?;

    if let Err(e) = run(&api, args.command).await {
        error!("Request to {} failed: {}", args.server, e);
        return Err(e);
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
