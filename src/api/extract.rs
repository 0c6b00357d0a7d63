//! Request extractors whose rejections render as [`ApiError`].

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use super::ApiError;

/// JSON request body. Malformed or mistyped bodies become a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters. Unparseable segments become a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RoleRequest;
    use axum::body::Body;

    fn json_request(body: &'static str, content_type: Option<&str>) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("Content-Type", content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_json_rejections_are_validation_errors() {
        let cases = [
            json_request(r#"{"permission_ids":"abc"}"#, Some("application/json")),
            json_request("{not json", Some("application/json")),
            json_request(r#"{"name":"editor"}"#, None),
        ];

        for request in cases {
            let result = ApiJson::<RoleRequest>::from_request(request, &()).await;
            assert!(matches!(result, Err(ApiError::ValidationError(_))));
        }
    }

    #[tokio::test]
    async fn test_json_accepts_valid_body() {
        let request = json_request(r#"{"name":"editor"}"#, Some("application/json"));
        let ApiJson(body) = ApiJson::<RoleRequest>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(body.name.as_deref(), Some("editor"));
    }
}
