//! Stock records and the JSON bodies exchanged over HTTP.
//!
//! A `StockRecord` is what the server stores and what the add endpoint echoes
//! back. The smaller body types (`PriceQuote`, `StockName`, `MessageBody`,
//! `ErrorBody`) are the projections the other endpoints answer with, shared so
//! that the client decodes exactly what the server encodes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use uuid::Uuid;

use crate::error::StockError;

/// Store-assigned opaque identity of a stock record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockId(Uuid);

impl StockId {
    /// Allocate a fresh random identity.
    pub fn new() -> Self {
        StockId(Uuid::new_v4())
    }

    /// Underlying UUID, for stores that keep it in a native column.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StockId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for StockId {
    fn from(uuid: Uuid) -> Self {
        StockId(uuid)
    }
}

impl FromStr for StockId {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(StockId(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A stored stock: ticker symbol, display name and last price.
///
/// Symbols are not unique; two records may share one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Identity assigned on insert, stable for the record's lifetime.
    pub id: StockId,
    /// Ticker symbol (e.g., `ACME`).
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Last price.
    pub price: f64,
}

impl StockRecord {
    /// Build a record for `stock` under a freshly allocated identity.
    pub fn create(stock: NewStock) -> Self {
        StockRecord {
            id: StockId::new(),
            symbol: stock.symbol,
            name: stock.name,
            price: stock.price,
        }
    }

    /// Overwrite the fields present in `update`, leaving the others as they are.
    pub fn apply(&mut self, update: &StockUpdate) {
        if let Some(symbol) = &update.symbol {
            self.symbol = symbol.clone();
        }
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
    }

    /// `{symbol, price}` projection served by the price lookup.
    pub fn quote(&self) -> PriceQuote {
        PriceQuote {
            symbol: self.symbol.clone(),
            price: self.price,
        }
    }

    /// `{label, value}` projection served by the names listing.
    pub fn stock_name(&self) -> StockName {
        StockName {
            label: self.name.clone(),
            value: self.symbol.clone(),
        }
    }
}

/// Validated insert payload; the store assigns the identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStock {
    /// Ticker symbol.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Initial price.
    pub price: f64,
}

/// Fields to overwrite in an update-by-identity. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockUpdate {
    /// Replacement symbol.
    pub symbol: Option<String>,
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement price.
    pub price: Option<f64>,
}

impl StockUpdate {
    /// Update that only replaces the price.
    pub fn price(price: f64) -> Self {
        StockUpdate {
            price: Some(price),
            ..Default::default()
        }
    }
}

/// Raw add-stock body.
///
/// Fields are kept as loose JSON values so that a body is only rejected for what
/// [`AddStockRequest::validate`] checks: a field is missing when it is absent or
/// falsy (`null`, `false`, `0`, `""`). Present values are then cast to the record's
/// types, so `"price": "10"` stores `10.0` and `"symbol": 123` stores `"123"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddStockRequest {
    /// Ticker symbol.
    pub symbol: Option<Value>,
    /// Display name.
    pub name: Option<Value>,
    /// Initial price.
    pub price: Option<Value>,
}

impl AddStockRequest {
    /// Request carrying already-typed fields.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        AddStockRequest {
            symbol: Some(Value::from(symbol.into())),
            name: Some(Value::from(name.into())),
            price: Some(Value::from(price)),
        }
    }

    /// Check that all three fields are present and truthy, then cast them.
    pub fn validate(self) -> Result<NewStock, StockError> {
        let symbol = present(self.symbol, "symbol")?;
        let name = present(self.name, "name")?;
        let price = present(self.price, "price")?;
        Ok(NewStock {
            symbol: cast_string(symbol, "symbol")?,
            name: cast_string(name, "name")?,
            price: cast_price(price)?,
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn present(value: Option<Value>, field: &str) -> Result<Value, StockError> {
    value
        .filter(is_truthy)
        .ok_or_else(|| StockError::Validation(format!("missing {field}")))
}

fn cast_string(value: Value, field: &str) -> Result<String, StockError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(number_text(&n)),
        other => Err(StockError::Validation(format!(
            "{field} is not a string: {other}"
        ))),
    }
}

/// Integral floats print without a fraction, so `12.0` becomes `"12"`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

fn cast_price(value: Value) -> Result<f64, StockError> {
    let price = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|p| p.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    price.ok_or_else(|| StockError::Validation(format!("price is not a number: {value}")))
}

/// Price lookup response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Ticker symbol.
    pub symbol: String,
    /// Current price.
    pub price: f64,
}

/// One entry of the names listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockName {
    /// Display name.
    pub label: String,
    /// Ticker symbol.
    pub value: String,
}

/// Success body carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Message text.
    pub message: String,
}

/// Failure body; never carries internal details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Message text.
    pub error: String,
}
