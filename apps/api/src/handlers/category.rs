//! Category CRUD.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kasir_core::validation::validate_category;
use kasir_core::{Category, CategoryInput, CategoryUpdate};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Category>> {
    find(&state, id).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    validate_category(&input)?;

    let category = state.db.categories().insert(&input).await?;
    info!(category_id = category.id, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// Partial update: absent fields keep their value, `"description": null`
/// clears the description.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<CategoryUpdate>,
) -> ApiResult<Json<Category>> {
    let current = find(&state, id).await?;

    let merged = update.apply_to(&current);
    validate_category(&merged)?;

    let category = state.db.categories().update(id, &merged).await?;
    info!(category_id = id, "Category updated");

    Ok(Json(category))
}

/// Deletes a category; its products become uncategorized.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.db.categories().delete(id).await?;
    info!(category_id = id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find(state: &AppState, id: i64) -> ApiResult<Category> {
    state
        .db
        .categories()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category", id))
}
