use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::validation::{
    decode_fingerprint, require, validate_email, validate_id, validate_name, validate_password,
};
use super::{ApiError, AppState, CreatePersonRequest, PersonDto, UpdatePersonRequest};
use crate::models::person::{NewPerson, PersonChanges};

pub async fn list_persons(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PersonDto>>, ApiError> {
    let persons = state.store().list_persons().await?;
    Ok(Json(persons.into_iter().map(PersonDto::from).collect()))
}

pub async fn get_person(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<PersonDto>, ApiError> {
    let id = validate_id(id)?;
    let person = state
        .store()
        .get_person(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Person", id))?;

    Ok(Json(person.into()))
}

pub async fn create_person(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreatePersonRequest>,
) -> Result<(StatusCode, Json<PersonDto>), ApiError> {
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("password is required"))?;
    validate_password(password)?;

    let input = NewPerson {
        first_name: validate_name(
            require(payload.first_name.as_ref(), "first_name")?,
            "first_name",
        )?,
        last_name: validate_name(
            require(payload.last_name.as_ref(), "last_name")?,
            "last_name",
        )?,
        email: validate_email(require(payload.email.as_ref(), "email")?)?,
        password: password.to_string(),
        picture: payload.picture,
        biometric_fingerprint: decode_fingerprint(payload.biometric_fingerprint.as_deref())?,
        category_id: payload.category_id,
        role_ids: payload.role_ids,
    };

    let person = state.store().create_person(input).await?;
    tracing::info!(person_id = person.person.id, "Created person");

    Ok((StatusCode::CREATED, Json(person.into())))
}

pub async fn update_person(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(payload): ApiJson<UpdatePersonRequest>,
) -> Result<Json<PersonDto>, ApiError> {
    let id = validate_id(id)?;

    if let Some(password) = payload.password.as_deref() {
        validate_password(password)?;
    }

    let changes = PersonChanges {
        first_name: payload
            .first_name
            .as_deref()
            .map(|v| validate_name(v, "first_name"))
            .transpose()?,
        last_name: payload
            .last_name
            .as_deref()
            .map(|v| validate_name(v, "last_name"))
            .transpose()?,
        email: payload.email.as_deref().map(validate_email).transpose()?,
        password: payload.password,
        picture: payload.picture,
        biometric_fingerprint: decode_fingerprint(payload.biometric_fingerprint.as_deref())?,
        category_id: payload.category_id,
        role_ids: payload.role_ids,
    };

    let person = state.store().update_person(id, changes).await?;
    Ok(Json(person.into()))
}

pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, ApiError> {
    let id = validate_id(id)?;

    if !state.store().delete_person(id).await? {
        return Err(ApiError::not_found("Person", id));
    }

    tracing::info!(person_id = id, "Deleted person");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /persons/{id}/roles/{role_id}
pub async fn add_role(
    State(state): State<Arc<AppState>>,
    ApiPath((id, role_id)): ApiPath<(i32, i32)>,
) -> Result<Json<PersonDto>, ApiError> {
    let person = state
        .store()
        .add_role_to_person(validate_id(id)?, validate_id(role_id)?)
        .await?;

    Ok(Json(person.into()))
}

/// DELETE /persons/{id}/roles/{role_id}
pub async fn remove_role(
    State(state): State<Arc<AppState>>,
    ApiPath((id, role_id)): ApiPath<(i32, i32)>,
) -> Result<Json<PersonDto>, ApiError> {
    let person = state
        .store()
        .remove_role_from_person(validate_id(id)?, validate_id(role_id)?)
        .await?;

    Ok(Json(person.into()))
}
