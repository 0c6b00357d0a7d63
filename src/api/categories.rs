use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::validation::{require, validate_id, validate_name};
use super::{ApiError, AppState, NameRequest};
use crate::models::category::Category;

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.store().list_categories().await?))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Category>, ApiError> {
    let id = validate_id(id)?;
    state
        .store()
        .get_category(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category", id))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NameRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let name = validate_name(require(payload.name.as_ref(), "name")?, "Category name")?;
    let category = state.store().create_category(&name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<NameRequest>,
) -> Result<Json<Category>, ApiError> {
    let id = validate_id(id)?;
    let name = validate_name(require(payload.name.as_ref(), "name")?, "Category name")?;
    Ok(Json(state.store().update_category(id, &name).await?))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id(id)?;

    if !state.store().delete_category(id).await? {
        return Err(ApiError::not_found("Category", id));
    }

    Ok(StatusCode::NO_CONTENT)
}
