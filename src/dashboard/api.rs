//! Dashboard HTTP API
//!
//! REST endpoints for the React frontend.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use super::types::*;
use super::AppState;
use crate::error::LedgerError;
use crate::types::TradeType;

/// Create the API router with all endpoints
pub fn create_router(state: Arc<AppState>, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/api/calculator/", post(calculate))
        .route("/api/trades/", get(list_trades).post(create_trade))
        .route(
            "/api/trades/:id/",
            get(get_trade).put(update_trade).delete(delete_trade),
        )
        .route("/api/dashboard/stats/", get(get_stats))
        .route("/api/health", get(get_health))
        .with_state(state);

    if cors_permissive {
        // CORS for frontend
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

fn ok<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponse::success(data))).into_response()
}

fn error_response(err: LedgerError) -> Response {
    let status = match &err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    if err.is_client_error() {
        tracing::debug!(error = %err, "Rejected request");
    } else if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = ?err, "Ledger storage failure");
    }
    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}

// ─────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────

/// POST /api/calculator/ - Fee preview, nothing is stored
async fn calculate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CalculatorRequest>,
) -> Response {
    let trade_type: TradeType = match req.trade_type.parse() {
        Ok(t) => t,
        Err(e) => return error_response(LedgerError::from(e)),
    };
    let buy_price = req.buy_price.as_ref().map(NumberInput::as_text);

    match state.schedule.calculate_raw(
        trade_type,
        &req.quantity.as_text(),
        &req.price.as_text(),
        buy_price.as_deref(),
    ) {
        Ok(fees) => ok(StatusCode::OK, fees),
        Err(e) => error_response(e.into()),
    }
}

/// GET /api/trades/ - All trades, newest first
async fn list_trades(State(state): State<Arc<AppState>>) -> Response {
    ok(StatusCode::OK, state.ledger.list().await)
}

/// POST /api/trades/ - Record a trade
async fn create_trade(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TradeRequest>,
) -> Response {
    let trade = match req.into_new_trade() {
        Ok(trade) => trade,
        Err(e) => return error_response(e),
    };
    match state.ledger.create(trade).await {
        Ok(record) => ok(StatusCode::CREATED, record),
        Err(e) => error_response(e),
    }
}

/// GET /api/trades/:id/
async fn get_trade(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Response {
    match state.ledger.get(id).await {
        Ok(record) => ok(StatusCode::OK, record),
        Err(e) => error_response(e),
    }
}

/// PUT /api/trades/:id/ - Replace a trade and recompute its fees
async fn update_trade(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<TradeRequest>,
) -> Response {
    let trade = match req.into_new_trade() {
        Ok(trade) => trade,
        Err(e) => return error_response(e),
    };
    match state.ledger.update(id, trade).await {
        Ok(record) => ok(StatusCode::OK, record),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/trades/:id/
async fn delete_trade(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> Response {
    match state.ledger.delete(id).await {
        Ok(record) => ok(StatusCode::OK, record),
        Err(e) => error_response(e),
    }
}

/// GET /api/dashboard/stats/ - Ledger totals
async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(state.ledger.stats().await))
}

/// GET /api/health
async fn get_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        trades: state.ledger.list().await.len(),
    }))
}
