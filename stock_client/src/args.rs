//! Command-line arguments for the Stock Client.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::{Parser, Subcommand};
use stock_common::net::DEFAULT_SERVER_URL;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Base URL of the stock server.
    #[arg(long, env = "STOCK_SERVER", default_value = DEFAULT_SERVER_URL)]
    pub server: String,

    /// Operation to run against the server.
    #[command(subcommand)]
    pub command: Command,
}

/// One call against the HTTP API.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current price of a symbol.
    Price {
        /// Ticker symbol, matched exactly.
        symbol: String,
    },
    /// List every stored stock as `SYMBOL  Name`.
    Names,
    /// Store a new stock.
    Add {
        /// Ticker symbol.
        #[arg(long)]
        symbol: String,
        /// Display name.
        #[arg(long)]
        name: String,
        /// Initial price; the server rejects 0.
        #[arg(long)]
        price: f64,
    },
    /// Delete the first stock with this symbol.
    Delete {
        /// Ticker symbol, matched exactly.
        symbol: String,
    },
}
