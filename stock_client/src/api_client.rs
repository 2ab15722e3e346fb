//! Calls to the stock server's HTTP API.
//!
//! `StockApi` wraps a `reqwest::Client` and the server's base URL. Every call maps a
//! non-success status onto `ClientError::Server`, carrying the `error` message the
//! server put in the body.
use log::debug;
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use stock_common::StockRecord;
use stock_common::stock::{AddStockRequest, ErrorBody, MessageBody, PriceQuote, StockName};

use crate::error::ClientError;
use crate::result::Result;

/// Handle for talking to one stock server.
pub struct StockApi {
    client: reqwest::Client,
    base: Url,
}

impl StockApi {
    /// Create a client for the server at `server` (e.g. `http://127.0.0.1:3001`).
    pub fn new(server: &str) -> Result<Self> {
        let base = Url::parse(server)
            .map_err(|e| ClientError::Format(format!("invalid server URL {}: {}", server, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Format(format!(
                "server URL {} cannot carry a path",
                server
            )));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::Format(format!("{} cannot carry a path", self.base)))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// `GET /api/stock/{symbol}`.
    pub async fn price(&self, symbol: &str) -> Result<PriceQuote> {
        let url = self.url(&["api", "stock", symbol])?;
        debug!("GET {}", url);
        decode(self.client.get(url).send().await?).await
    }

    /// `GET /api/stock_names`.
    pub async fn names(&self) -> Result<Vec<StockName>> {
        let url = self.url(&["api", "stock_names"])?;
        debug!("GET {}", url);
        decode(self.client.get(url).send().await?).await
    }

    /// `POST /api/add_stock`.
    pub async fn add(&self, request: &AddStockRequest) -> Result<StockRecord> {
        let url = self.url(&["api", "add_stock"])?;
        debug!("POST {} {:?}", url, request);
        decode(self.client.post(url).json(request).send().await?).await
    }

    /// `DELETE /api/delete_stock/{symbol}`.
    pub async fn delete(&self, symbol: &str) -> Result<MessageBody> {
        let url = self.url(&["api", "delete_stock", symbol])?;
        debug!("DELETE {}", url);
        decode(self.client.delete(url).send().await?).await
    }
}

/// Decode a success body as `T`, or turn the failure body into `ClientError::Server`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let text = response.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Server { status, message })
}
