//! HTTP API.
//!
//! Four routes, each a direct translation to one record store call:
//!
//! | Method | Path                         | Success                        |
//! |--------|------------------------------|--------------------------------|
//! | GET    | `/api/stock/{symbol}`        | 200 `{symbol, price}`          |
//! | GET    | `/api/stock_names`           | 200 `[{label, value}, ...]`    |
//! | POST   | `/api/add_stock`             | 201 stored record              |
//! | DELETE | `/api/delete_stock/{symbol}` | 200 `{message}`                |
//!
//! Failures map onto [`ApiError`]: 400 for invalid add-stock bodies, 404 when no
//! record matches, 500 for any store failure. Store errors are logged here and the
//! client only ever sees `Internal Server Error`.
//!
//! Prices are never written through the API; only the refresher changes them.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use log::{debug, error, info, warn};
use stock_common::net::{ADD_STOCK_ROUTE, DELETE_STOCK_ROUTE, STOCK_NAMES_ROUTE, STOCK_ROUTE};
use stock_common::stock::{AddStockRequest, ErrorBody, MessageBody, PriceQuote, StockName};
use stock_common::{StockError, StockRecord};
use thiserror::Error;
use tower_http::cors::CorsLayer;

use crate::store::{StockFilter, StockStore, StoreError};

/// Shared handler state: a handle to the record store.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn StockStore>,
}

impl AppState {
    /// Wrap a store handle.
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self { store }
    }
}

/// Request failure, rendered as `{"error": ...}` with the matching status.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Add-stock body is malformed or misses a field.
    #[error("Invalid stock data: {0}")]
    Validation(String),

    /// No record matches the requested symbol.
    #[error("Stock not found")]
    NotFound,

    /// The record store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(reason) => {
                warn!("Rejected stock data: {}", reason);
                (StatusCode::BAD_REQUEST, "Invalid stock data")
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Stock not found"),
            ApiError::Store(e) => {
                error!("Store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        let body = ErrorBody {
            error: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the router with permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(STOCK_ROUTE, get(get_stock_price))
        .route(STOCK_NAMES_ROUTE, get(list_stock_names))
        .route(ADD_STOCK_ROUTE, post(add_stock))
        .route(DELETE_STOCK_ROUTE, delete(delete_stock))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_stock_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<PriceQuote>, ApiError> {
    debug!("Price requested for {}", symbol);
    let record = state
        .store
        .find_one(&StockFilter::Symbol(symbol))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(record.quote()))
}

/// Iteration order is whatever the store yields; callers must not rely on it.
async fn list_stock_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockName>>, ApiError> {
    let records = state.store.find(&StockFilter::All).await?;
    Ok(Json(records.iter().map(StockRecord::stock_name).collect()))
}

async fn add_stock(
    State(state): State<AppState>,
    payload: Result<Json<AddStockRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StockRecord>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let stock = request.validate()?;
    let record = state.store.insert(stock).await?;
    info!("Added stock {} ({}) as {}", record.symbol, record.name, record.id);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn delete_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let removed = state
        .store
        .delete_one(&StockFilter::Symbol(symbol))
        .await?
        .ok_or(ApiError::NotFound)?;
    info!("Deleted stock {} ({})", removed.symbol, removed.id);
    Ok(Json(MessageBody {
        message: "Stock deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use stock_common::StockId;
    use stock_common::stock::{NewStock, StockUpdate};
    use tower::ServiceExt;

    /// Store that fails every call, to check 500 handling.
    struct BrokenStore;

    fn broken() -> StoreError {
        StoreError::Corrupt("secret detail".into())
    }

    #[async_trait]
    impl StockStore for BrokenStore {
        async fn find(&self, _: &StockFilter) -> Result<Vec<StockRecord>, StoreError> {
            Err(broken())
        }

        async fn find_one(&self, _: &StockFilter) -> Result<Option<StockRecord>, StoreError> {
            Err(broken())
        }

        async fn insert(&self, _: NewStock) -> Result<StockRecord, StoreError> {
            Err(broken())
        }

        async fn update_by_id(
            &self,
            _: StockId,
            _: StockUpdate,
        ) -> Result<Option<StockRecord>, StoreError> {
            Err(broken())
        }

        async fn delete_one(&self, _: &StockFilter) -> Result<Option<StockRecord>, StoreError> {
            Err(broken())
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn get_price_of_unknown_symbol_is_404() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())));
        let (status, body) = send(&app, get("/api/stock/NOPE")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Stock not found" }));
    }

    #[tokio::test]
    async fn add_returns_created_record_with_id() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())));
        let (status, body) = send(
            &app,
            post_json(
                "/api/add_stock",
                r#"{"symbol":"ACME","name":"Acme Corp","price":10}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["symbol"], "ACME");
        assert_eq!(body["name"], "Acme Corp");
        assert_eq!(body["price"], 10.0);
        let id = body["id"].as_str().unwrap();
        assert!(id.parse::<StockId>().is_ok());
    }

    #[tokio::test]
    async fn add_with_missing_or_falsy_field_is_400() {
        let store = Arc::new(MemoryStore::new());
        let app = router(AppState::new(store.clone()));
        let bodies = [
            r#"{"name":"Acme Corp","price":10}"#,
            r#"{"symbol":"ACME","price":10}"#,
            r#"{"symbol":"ACME","name":"Acme Corp"}"#,
            r#"{"symbol":"ACME","name":"Acme Corp","price":0}"#,
            r#"{"symbol":"","name":"Acme Corp","price":10}"#,
            r#"{"symbol":"ACME","name":"Acme Corp","price":"ten"}"#,
            "not json",
        ];
        for body in bodies {
            let (status, response) = send(&app, post_json("/api/add_stock", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(response, json!({ "error": "Invalid stock data" }));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn add_casts_numeric_strings_and_numeric_symbols() {
        let store = Arc::new(MemoryStore::new());
        let app = router(AppState::new(store.clone()));

        let (status, body) = send(
            &app,
            post_json(
                "/api/add_stock",
                r#"{"symbol":"ACME","name":"Acme","price":"10"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["price"], 10.0);

        let (status, body) = send(
            &app,
            post_json("/api/add_stock", r#"{"symbol":123,"name":"Acme","price":10}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["symbol"], "123");

        let (status, quote) = send(&app, get("/api/stock/123")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quote, json!({ "symbol": "123", "price": 10.0 }));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn names_project_label_and_value() {
        let store = Arc::new(MemoryStore::new());
        for (symbol, name) in [("AAA", "Alpha"), ("BBB", "Beta")] {
            store
                .insert(NewStock {
                    symbol: symbol.into(),
                    name: name.into(),
                    price: 1.0,
                })
                .await
                .unwrap();
        }
        let app = router(AppState::new(store));
        let (status, body) = send(&app, get("/api/stock_names")).await;
        assert_eq!(status, StatusCode::OK);
        let mut entries = body.as_array().unwrap().clone();
        entries.sort_by_key(|e| e["value"].as_str().unwrap().to_string());
        assert_eq!(
            entries,
            vec![
                json!({ "label": "Alpha", "value": "AAA" }),
                json!({ "label": "Beta", "value": "BBB" }),
            ]
        );
    }

    #[tokio::test]
    async fn delete_of_unknown_symbol_is_404() {
        let app = router(AppState::new(Arc::new(MemoryStore::new())));
        let request = Request::delete("/api/delete_stock/NOPE")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Stock not found" }));
    }

    #[tokio::test]
    async fn store_failures_are_500_without_detail() {
        let app = router(AppState::new(Arc::new(BrokenStore)));
        let delete = Request::delete("/api/delete_stock/ACME")
            .body(Body::empty())
            .unwrap();
        let add = post_json(
            "/api/add_stock",
            r#"{"symbol":"ACME","name":"Acme Corp","price":10}"#,
        );
        for request in [get("/api/stock/ACME"), get("/api/stock_names"), add, delete] {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({ "error": "Internal Server Error" }));
            assert!(!body.to_string().contains("secret"));
        }
    }
}
