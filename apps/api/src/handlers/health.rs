//! Liveness and service banner.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::AppState;

/// Endpoints listed by the banner.
pub const ENDPOINTS: &[&str] = &[
    "POST /checkout",
    "GET /transactions/{id}",
    "GET /report/today",
    "GET /products",
    "POST /products",
    "GET /products/{id}",
    "PUT /products/{id}",
    "DELETE /products/{id}",
    "GET /categories",
    "POST /categories",
    "GET /categories/{id}",
    "PUT /categories/{id}",
    "DELETE /categories/{id}",
    "GET /health",
];

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
}

/// `200` when the database answers, `503` otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    if state.db.health_check().await {
        (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok",
                database: true,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "unavailable",
                database: false,
            }),
        )
    }
}

/// Service banner.
pub async fn index() -> Json<Value> {
    Json(json!({
        "status": "Success",
        "message": "Welcome to the Kasir API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ENDPOINTS,
    }))
}
