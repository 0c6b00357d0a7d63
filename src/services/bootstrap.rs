//! Seeds the sentinel roles, the basic permission set and (optionally) an
//! administrator account. Every step checks before it writes, so running the
//! routine any number of times converges on the same state.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::BootstrapConfig;
use crate::constants::{permissions, roles};
use crate::db::{Store, StoreError, StoreResult};
use crate::models::person::NewPerson;

/// What a single bootstrap run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub roles_created: Vec<String>,
    pub permissions_created: Vec<String>,
    pub edges_added: usize,
    pub admin_created: bool,
}

impl BootstrapReport {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.roles_created.is_empty()
            && self.permissions_created.is_empty()
            && self.edges_added == 0
            && !self.admin_created
    }
}

pub struct BootstrapService {
    store: Store,
    config: BootstrapConfig,
}

impl BootstrapService {
    #[must_use]
    pub const fn new(store: Store, config: BootstrapConfig) -> Self {
        Self { store, config }
    }

    pub async fn run(&self) -> StoreResult<BootstrapReport> {
        let mut report = BootstrapReport::default();

        let (admin, created) = self.store.ensure_role(roles::ADMIN).await?;
        if created {
            report.roles_created.push(admin.name.clone());
        }

        let (user, created) = self.store.ensure_role(roles::USER).await?;
        if created {
            report.roles_created.push(user.name.clone());
        }

        for name in permissions::BASIC {
            let (_, created) = self.store.ensure_permission(name).await?;
            if created {
                report.permissions_created.push((*name).to_string());
            }
        }

        // Admin holds every permission that exists, not only the basic set.
        let all: Vec<i32> = self
            .store
            .list_permissions()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        report.edges_added += self.store.attach_missing_permissions(admin.id, &all).await?;

        let mut user_defaults = Vec::with_capacity(permissions::USER_DEFAULTS.len());
        for name in permissions::USER_DEFAULTS {
            if let Some(permission) = self.store.get_permission_by_name(name).await? {
                user_defaults.push(permission.id);
            }
        }
        report.edges_added += self
            .store
            .attach_missing_permissions(user.id, &user_defaults)
            .await?;

        if self.config.create_admin {
            report.admin_created = self.ensure_admin(admin.id).await?;
        }

        if report.is_noop() {
            info!("Bootstrap: roles and permissions already in place");
        } else {
            info!(
                roles = ?report.roles_created,
                permissions = report.permissions_created.len(),
                edges = report.edges_added,
                admin_created = report.admin_created,
                "Bootstrap applied"
            );
        }

        Ok(report)
    }

    /// Creates the configured admin account when it is missing. An existing
    /// account is left alone, roles included.
    async fn ensure_admin(&self, admin_role_id: i32) -> StoreResult<bool> {
        let email = self.config.admin_email.as_str();

        if self.store.person_email_exists(email).await? {
            debug!(email, "Admin account already exists");
            return Ok(false);
        }

        let input = NewPerson {
            first_name: self.config.admin_first_name.clone(),
            last_name: self.config.admin_last_name.clone(),
            email: email.to_string(),
            password: self.config.admin_password.clone(),
            picture: None,
            biometric_fingerprint: None,
            category_id: None,
            role_ids: Some(vec![admin_role_id]),
        };

        match self.store.create_person(input).await {
            Ok(person) => {
                info!(person_id = person.person.id, email, "Created admin account");
                Ok(true)
            }
            Err(StoreError::Conflict(_)) => {
                warn!(email, "Admin account appeared concurrently, skipping");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
