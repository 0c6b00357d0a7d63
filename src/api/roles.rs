use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::validation::{require, validate_id, validate_name};
use super::{ApiError, AppState, RoleDto, RoleRequest};
use crate::models::role::{NewRole, RoleChanges};

pub async fn list_roles(State(state): State<Arc<AppState>>) -> Result<Json<Vec<RoleDto>>, ApiError> {
    let roles = state.store().list_roles().await?;
    Ok(Json(roles.into_iter().map(RoleDto::from).collect()))
}

pub async fn get_role(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<RoleDto>, ApiError> {
    let id = validate_id(id)?;
    let role = state
        .store()
        .get_role(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Role", id))?;

    Ok(Json(role.into()))
}

pub async fn create_role(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RoleRequest>,
) -> Result<(StatusCode, Json<RoleDto>), ApiError> {
    let name = validate_name(require(payload.name.as_ref(), "name")?, "Role name")?;

    let role = state
        .store()
        .create_role(NewRole {
            name,
            permission_ids: payload.permission_ids.unwrap_or_default(),
        })
        .await?;

    tracing::info!(role_id = role.role.id, name = %role.role.name, "Created role");
    Ok((StatusCode::CREATED, Json(role.into())))
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<RoleRequest>,
) -> Result<Json<RoleDto>, ApiError> {
    let id = validate_id(id)?;

    let changes = RoleChanges {
        name: payload
            .name
            .as_deref()
            .map(|v| validate_name(v, "Role name"))
            .transpose()?,
        permission_ids: payload.permission_ids,
    };

    let role = state.store().update_role(id, changes).await?;
    Ok(Json(role.into()))
}

pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id(id)?;

    if !state.store().delete_role(id).await? {
        return Err(ApiError::not_found("Role", id));
    }

    tracing::info!(role_id = id, "Deleted role");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /roles/{id}/permissions/{permission_id}
pub async fn add_permission(
    State(state): State<Arc<AppState>>,
    ApiPath((id, permission_id)): ApiPath<(i32, i32)>,
) -> Result<Json<RoleDto>, ApiError> {
    let role = state
        .store()
        .add_permission_to_role(validate_id(id)?, validate_id(permission_id)?)
        .await?;

    Ok(Json(role.into()))
}

/// DELETE /roles/{id}/permissions/{permission_id}
pub async fn remove_permission(
    State(state): State<Arc<AppState>>,
    ApiPath((id, permission_id)): ApiPath<(i32, i32)>,
) -> Result<Json<RoleDto>, ApiError> {
    let role = state
        .store()
        .remove_permission_from_role(validate_id(id)?, validate_id(permission_id)?)
        .await?;

    Ok(Json(role.into()))
}
