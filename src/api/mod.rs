use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::constants;
use crate::state::SharedState;

pub mod auth;
mod categories;
mod error;
mod extract;
mod observability;
mod permissions;
mod persons;
mod roles;
mod types;
mod validation;

pub use auth::{Identity, RoleGate, require_any_of};
pub use error::ApiError;
pub use extract::{ApiJson, ApiPath};
pub use types::*;

use crate::services::{AuthService, TokenService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.shared.tokens
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/health", get(observability::health))
        .route("/categories", get(categories::list_categories))
        .route("/categories/{id}", get(categories::get_category));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(create_authenticated_router(state.clone()))
        .merge(create_admin_router(state.clone()))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .fallback(|| async { ApiError::NotFound("Route not found".to_string()) })
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
}

/// Routes open to any holder of a valid token.
fn create_authenticated_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/profile", get(auth::profile))
        .route_layer(middleware::from_fn_with_state(state, auth::authenticate))
}

fn create_admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin_only = require_any_of(state.clone(), &[constants::roles::ADMIN]);

    Router::new()
        .route(
            "/persons",
            get(persons::list_persons).post(persons::create_person),
        )
        .route(
            "/persons/{id}",
            get(persons::get_person)
                .put(persons::update_person)
                .delete(persons::delete_person),
        )
        .route(
            "/persons/{id}/roles/{role_id}",
            post(persons::add_role).delete(persons::remove_role),
        )
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .delete(roles::delete_role),
        )
        .route(
            "/roles/{id}/permissions/{permission_id}",
            post(roles::add_permission).delete(roles::remove_permission),
        )
        .route(
            "/permissions",
            get(permissions::list_permissions).post(permissions::create_permission),
        )
        .route(
            "/permissions/{id}",
            get(permissions::get_permission)
                .put(permissions::update_permission)
                .delete(permissions::delete_permission),
        )
        .route("/categories", post(categories::create_category))
        .route(
            "/categories/{id}",
            put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(admin_only, auth::authorize))
        .route_layer(middleware::from_fn_with_state(state, auth::authenticate))
}
