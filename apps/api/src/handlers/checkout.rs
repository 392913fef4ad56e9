//! `POST /checkout` and sale lookup.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kasir_core::{CheckoutRequest, Transaction};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Converts a cart into a committed sale.
///
/// `201 Created` with the transaction and its details on success.
pub async fn checkout(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let transaction = state.db.transactions().checkout(&request.items).await?;

    info!(
        transaction_id = transaction.id,
        total_amount = transaction.total_amount,
        "Sale recorded"
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Returns one committed sale with its details.
pub async fn get_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Transaction>> {
    state
        .db
        .transactions()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Transaction", id))
}
