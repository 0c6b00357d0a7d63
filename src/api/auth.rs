use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::extract::ApiJson;
use super::validation::{decode_fingerprint, require, validate_email, validate_name, validate_password};
use super::{ApiError, AppState, AuthResponse, LoginRequest, PersonDto, SignupRequest};
use crate::models::person::NewPerson;

// ============================================================================
// Identity
// ============================================================================

/// The verified subject of a request, inserted by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub person_id: i32,
    pub email: Option<String>,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Verifies the bearer token and attaches an [`Identity`]. Never touches storage.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())
        .ok_or_else(|| ApiError::unauthorized("No token provided"))?;

    let claims = state.tokens().verify(token)?;

    tracing::Span::current().record("user_id", claims.id);
    request.extensions_mut().insert(Identity {
        person_id: claims.id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Token is the second whitespace-separated segment of `Authorization`.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_whitespace()
        .nth(1)
}

/// State for [`authorize`]: the app plus the roles that open the gate.
#[derive(Clone)]
pub struct RoleGate {
    state: Arc<AppState>,
    roles: Arc<[&'static str]>,
}

#[must_use]
pub fn require_any_of(state: Arc<AppState>, roles: &[&'static str]) -> RoleGate {
    RoleGate {
        state,
        roles: Arc::from(roles),
    }
}

/// Re-reads the subject's roles on every request and lets it through only if
/// one of them is in the gate's set. Must run behind [`authenticate`].
pub async fn authorize(
    State(gate): State<RoleGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

    gate.state
        .auth_service()
        .authorize(identity.person_id, &gate.roles)
        .await?;

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let first_name = validate_name(
        require(payload.first_name.as_ref(), "first_name")?,
        "first_name",
    )?;
    let last_name = validate_name(
        require(payload.last_name.as_ref(), "last_name")?,
        "last_name",
    )?;
    let email = validate_email(require(payload.email.as_ref(), "email")?)?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("password is required"))?;
    validate_password(password)?;

    let input = NewPerson {
        first_name,
        last_name,
        email,
        password: password.to_string(),
        picture: payload.picture,
        biometric_fingerprint: decode_fingerprint(payload.biometric_fingerprint.as_deref())?,
        category_id: payload.category_id,
        role_ids: payload.role_ids,
    };

    let session = state.auth_service().signup(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Signup successful".to_string(),
            user: session.person.into(),
            token: session.token,
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = require(payload.email.as_ref(), "email")?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::validation("password is required"))?;

    let session = state.auth_service().login(email, password).await?;

    tracing::info!(person_id = session.person.person.id, "Login successful");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: session.person.into(),
        token: session.token,
    }))
}

/// GET /auth/profile
pub async fn profile(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> Result<Json<PersonDto>, ApiError> {
    let person = state.auth_service().profile(identity.person_id).await?;
    Ok(Json(person.into()))
}
