//! Product CRUD.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use kasir_core::validation::{validate_id, validate_new_product};
use kasir_core::{NewProduct, Product, ProductUpdate};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// `GET /products` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().list(filter.name.as_deref()).await?;
    Ok(Json(products))
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Product>> {
    find(&state, id).await.map(Json)
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    validate_new_product(&input)?;

    let product = state.db.products().insert(&input).await?;
    info!(product_id = product.id, name = %product.name, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Partial update: absent fields keep their value, `"category_id": null`
/// clears the category.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    let current = find(&state, id).await?;

    let merged = update.apply_to(&current);
    validate_new_product(&merged)?;

    let product = state.db.products().update(id, &merged).await?;
    info!(product_id = id, "Product updated");

    Ok(Json(product))
}

/// Soft delete; past sales keep their snapshot.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    state.db.products().soft_delete(id).await?;
    info!(product_id = id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find(state: &AppState, id: i64) -> ApiResult<Product> {
    validate_id("id", id).map_err(|_| ApiError::not_found("Product", id))?;

    state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}
