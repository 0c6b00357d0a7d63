//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tokio::task;
use tracing::{debug, info};

use crate::db::{Store, StoreError, verify_password_hash};
use crate::models::person::{NewPerson, PersonDetails};
use crate::services::auth_service::{AuthError, AuthService, AuthSession};
use crate::services::token::TokenService;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenService,
    restrict_signup_roles: bool,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenService) -> Self {
        Self {
            store,
            tokens,
            restrict_signup_roles: false,
        }
    }

    /// Drop any `role_ids` a signup asks for.
    #[must_use]
    pub const fn with_restricted_signup_roles(mut self, restrict: bool) -> Self {
        self.restrict_signup_roles = restrict;
        self
    }

    fn session(&self, person: PersonDetails) -> Result<AuthSession, AuthError> {
        let token = self.tokens.issue(person.person.id, &person.person.email)?;
        Ok(AuthSession { person, token })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, mut input: NewPerson) -> Result<AuthSession, AuthError> {
        if self.store.person_email_exists(&input.email).await? {
            return Err(AuthError::EmailTaken);
        }

        if self.restrict_signup_roles {
            input.role_ids = None;
        }

        let person = self.store.create_person(input).await.map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::Store(other),
        })?;

        info!(person_id = person.person.id, "Person signed up");
        self.session(person)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let (person, password_hash) = self
            .store
            .get_person_by_email_with_password(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let password = password.to_string();
        let is_valid = task::spawn_blocking(move || verify_password_hash(&password_hash, &password))
            .await
            .map_err(|e| StoreError::Hashing(format!("verification task panicked: {e}")))??;

        if !is_valid {
            debug!(person_id = person.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let details = self
            .store
            .get_person(person.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.session(details)
    }

    async fn profile(&self, person_id: i32) -> Result<PersonDetails, AuthError> {
        self.store
            .get_person(person_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn authorize(
        &self,
        person_id: i32,
        required: &[&str],
    ) -> Result<PersonDetails, AuthError> {
        let person = self
            .store
            .get_person(person_id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !person.has_any_role(required) {
            debug!(
                person_id,
                roles = ?person.role_names(),
                required = ?required,
                "Role check failed"
            );
            return Err(AuthError::Forbidden);
        }

        Ok(person)
    }
}
