//! `GET /report/today`.

use axum::extract::State;
use axum::Json;
use kasir_core::TodayReport;

use crate::error::ApiResult;
use crate::state::AppState;

/// Revenue, sale count and best sellers for the store's current day.
pub async fn today(State(state): State<AppState>) -> ApiResult<Json<TodayReport>> {
    let report = state.db.reports().today(state.utc_offset).await?;
    Ok(Json(report))
}
