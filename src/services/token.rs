//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the person id. They are stateless: a token is
//! valid while its signature checks out and less than 24 hours have passed
//! since it was issued. There is no revocation list.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Person id
    pub id: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub iat: i64,

    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: i64::try_from(constants::auth::TOKEN_TTL.as_secs()).unwrap_or(i64::MAX),
        }
    }

    pub fn issue(&self, person_id: i32, email: &str) -> Result<String, TokenError> {
        self.issue_at(person_id, email, Utc::now())
    }

    pub fn issue_at(
        &self,
        person_id: i32,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            id: person_id,
            email: Some(email.to_string()),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Checks the signature, then expiry against `now` with no leeway.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_token_carries_subject() {
        let service = TokenService::new("test-secret");
        let token = service.issue_at(42, "a@x.com", t0()).unwrap();

        let claims = service.verify_at(&token, t0()).unwrap();
        assert_eq!(claims.id, 42);
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_token_valid_until_exactly_one_day() {
        let service = TokenService::new("test-secret");
        let token = service.issue_at(1, "a@x.com", t0()).unwrap();

        let just_before = t0() + Duration::hours(24) - Duration::seconds(1);
        assert!(service.verify_at(&token, just_before).is_ok());

        let at_expiry = t0() + Duration::hours(24);
        assert_eq!(
            service.verify_at(&token, at_expiry),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("one").issue_at(1, "a@x.com", t0()).unwrap();
        let result = TokenService::new("two").verify_at(&token, t0());
        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let service = TokenService::new("test-secret");
        let token = service.issue_at(1, "a@x.com", t0()).unwrap();
        let other = service.issue_at(2, "b@x.com", t0()).unwrap();

        // Header and signature from the first token, payload from the second.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(service.verify_at(&forged, t0()).is_err());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = TokenService::new("test-secret");
        assert!(matches!(
            service.verify_at("not-a-token", t0()),
            Err(TokenError::Malformed(_))
        ));
        assert!(matches!(
            service.verify_at("", t0()),
            Err(TokenError::Malformed(_))
        ));
    }
}
