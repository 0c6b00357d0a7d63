use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::validation::{require, validate_id, validate_name};
use super::{ApiError, AppState, NameRequest};
use crate::models::role::Permission;

pub async fn list_permissions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Permission>>, ApiError> {
    Ok(Json(state.store().list_permissions().await?))
}

pub async fn get_permission(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Permission>, ApiError> {
    let id = validate_id(id)?;
    state
        .store()
        .get_permission(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Permission", id))
}

pub async fn create_permission(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NameRequest>,
) -> Result<(StatusCode, Json<Permission>), ApiError> {
    let name = validate_name(require(payload.name.as_ref(), "name")?, "Permission name")?;
    let permission = state.store().create_permission(&name).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

pub async fn update_permission(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<NameRequest>,
) -> Result<Json<Permission>, ApiError> {
    let id = validate_id(id)?;
    let name = validate_name(require(payload.name.as_ref(), "name")?, "Permission name")?;
    Ok(Json(state.store().update_permission(id, &name).await?))
}

pub async fn delete_permission(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id(id)?;

    if !state.store().delete_permission(id).await? {
        return Err(ApiError::not_found("Permission", id));
    }

    Ok(StatusCode::NO_CONTENT)
}
