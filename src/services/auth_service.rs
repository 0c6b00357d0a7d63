//! Domain service for authentication and role checks.
//!
//! Handles signup, login, profile lookup and the role test behind the
//! authorization gate.

use thiserror::Error;

use crate::db::StoreError;
use crate::models::person::{NewPerson, PersonDetails};
use crate::services::token::TokenError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User with this email already exists")]
    EmailTaken,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: Insufficient permissions")]
    Forbidden,

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A person plus a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub person: PersonDetails,
    pub token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a person with the default role and signs them in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] if the email is already registered.
    async fn signup(&self, input: NewPerson) -> Result<AuthSession, AuthError>;

    /// Verifies credentials and issues a token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserNotFound`] for an unknown email and
    /// [`AuthError::InvalidCredentials`] for a wrong password.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Loads the person behind a verified token.
    async fn profile(&self, person_id: i32) -> Result<PersonDetails, AuthError>;

    /// Loads the person's roles fresh from storage and checks them against
    /// `required`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] if the person no longer exists and
    /// [`AuthError::Forbidden`] if none of its roles is in `required`.
    async fn authorize(
        &self,
        person_id: i32,
        required: &[&str],
    ) -> Result<PersonDetails, AuthError>;
}
