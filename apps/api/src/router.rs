//! Route table.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{category, checkout, health, product, report};
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/checkout", post(checkout::checkout))
        .route("/transactions/{id}", get(checkout::get_transaction))
        .route("/report/today", get(report::today))
        .route("/products", get(product::list).post(product::create))
        .route(
            "/products/{id}",
            get(product::get).put(product::update).delete(product::delete),
        )
        .route("/categories", get(category::list).post(category::create))
        .route(
            "/categories/{id}",
            get(category::get)
                .put(category::update)
                .delete(category::delete),
        )
        .with_state(state)
}
