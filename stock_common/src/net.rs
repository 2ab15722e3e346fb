//! Shared networking constants and defaults used by client and server.

/// TCP port the HTTP API listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 3001;
/// Seconds between two price refresh ticks.
pub const DEFAULT_REFRESH_SECS: u64 = 5;
/// Database the server always connects to, whatever the endpoint says.
pub const DATABASE_NAME: &str = "stock_tracker";
/// Local PostgreSQL endpoint in `tokio-postgres` key/value form.
pub const DEFAULT_DATABASE_URL: &str = "host=127.0.0.1 port=5432 user=postgres dbname=stock_tracker";
/// Base URL the client talks to by default.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3001";

/// Route template for the price lookup.
pub const STOCK_ROUTE: &str = "/api/stock/{symbol}";
/// Route for the `{label, value}` listing.
pub const STOCK_NAMES_ROUTE: &str = "/api/stock_names";
/// Route for creating a stock.
pub const ADD_STOCK_ROUTE: &str = "/api/add_stock";
/// Route template for deleting by symbol.
pub const DELETE_STOCK_ROUTE: &str = "/api/delete_stock/{symbol}";

/// Helper to format a bind address like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}
