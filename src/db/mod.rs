use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::{GeneralConfig, SecurityConfig};
use crate::models::category::Category;
use crate::models::person::{NewPerson, Person, PersonChanges, PersonDetails};
use crate::models::role::{NewRole, Permission, Role, RoleChanges, RoleDetails};

pub mod error;
pub mod migrator;
pub mod repositories;

pub use error::{StoreError, StoreResult};
pub use repositories::person::{hash_password, verify_password_hash};

use repositories::category::CategoryRepository;
use repositories::permission::PermissionRepository;
use repositories::person::PersonRepository;
use repositories::role::RoleRepository;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    security: SecurityConfig,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1, SecurityConfig::default()).await
    }

    pub async fn from_config(general: &GeneralConfig, security: &SecurityConfig) -> Result<Self> {
        Self::with_pool_options(
            &general.database_url,
            general.max_db_connections,
            general.min_db_connections,
            security.clone(),
        )
        .await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
        security: SecurityConfig,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` would see its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn, security })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn person_repo(&self) -> PersonRepository {
        PersonRepository::new(self.conn.clone(), self.security.clone())
    }

    fn role_repo(&self) -> RoleRepository {
        RoleRepository::new(self.conn.clone())
    }

    fn permission_repo(&self) -> PermissionRepository {
        PermissionRepository::new(self.conn.clone())
    }

    fn category_repo(&self) -> CategoryRepository {
        CategoryRepository::new(self.conn.clone())
    }

    // Persons

    pub async fn list_persons(&self) -> StoreResult<Vec<PersonDetails>> {
        self.person_repo().list().await
    }

    pub async fn get_person(&self, id: i32) -> StoreResult<Option<PersonDetails>> {
        self.person_repo().get(id).await
    }

    pub async fn get_person_by_email_with_password(
        &self,
        email: &str,
    ) -> StoreResult<Option<(Person, String)>> {
        self.person_repo().get_by_email_with_password(email).await
    }

    pub async fn person_email_exists(&self, email: &str) -> StoreResult<bool> {
        self.person_repo().email_exists(email).await
    }

    pub async fn create_person(&self, input: NewPerson) -> StoreResult<PersonDetails> {
        self.person_repo().create(input).await
    }

    pub async fn update_person(&self, id: i32, changes: PersonChanges) -> StoreResult<PersonDetails> {
        self.person_repo().update(id, changes).await
    }

    pub async fn delete_person(&self, id: i32) -> StoreResult<bool> {
        self.person_repo().delete(id).await
    }

    pub async fn add_role_to_person(
        &self,
        person_id: i32,
        role_id: i32,
    ) -> StoreResult<PersonDetails> {
        self.person_repo().add_role(person_id, role_id).await
    }

    pub async fn remove_role_from_person(
        &self,
        person_id: i32,
        role_id: i32,
    ) -> StoreResult<PersonDetails> {
        self.person_repo().remove_role(person_id, role_id).await
    }

    // Roles

    pub async fn list_roles(&self) -> StoreResult<Vec<RoleDetails>> {
        self.role_repo().list().await
    }

    pub async fn get_role(&self, id: i32) -> StoreResult<Option<RoleDetails>> {
        self.role_repo().get(id).await
    }

    pub async fn get_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        self.role_repo().get_by_name(name).await
    }

    pub async fn create_role(&self, input: NewRole) -> StoreResult<RoleDetails> {
        self.role_repo().create(input).await
    }

    pub async fn update_role(&self, id: i32, changes: RoleChanges) -> StoreResult<RoleDetails> {
        self.role_repo().update(id, changes).await
    }

    pub async fn delete_role(&self, id: i32) -> StoreResult<bool> {
        self.role_repo().delete(id).await
    }

    pub async fn add_permission_to_role(
        &self,
        role_id: i32,
        permission_id: i32,
    ) -> StoreResult<RoleDetails> {
        self.role_repo().add_permission(role_id, permission_id).await
    }

    pub async fn remove_permission_from_role(
        &self,
        role_id: i32,
        permission_id: i32,
    ) -> StoreResult<RoleDetails> {
        self.role_repo()
            .remove_permission(role_id, permission_id)
            .await
    }

    pub async fn ensure_role(&self, name: &str) -> StoreResult<(Role, bool)> {
        self.role_repo().ensure(name).await
    }

    pub async fn attach_missing_permissions(
        &self,
        role_id: i32,
        permission_ids: &[i32],
    ) -> StoreResult<usize> {
        self.role_repo()
            .attach_missing_permissions(role_id, permission_ids)
            .await
    }

    // Permissions

    pub async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        self.permission_repo().list().await
    }

    pub async fn get_permission(&self, id: i32) -> StoreResult<Option<Permission>> {
        self.permission_repo().get(id).await
    }

    pub async fn get_permission_by_name(&self, name: &str) -> StoreResult<Option<Permission>> {
        self.permission_repo().get_by_name(name).await
    }

    pub async fn create_permission(&self, name: &str) -> StoreResult<Permission> {
        self.permission_repo().create(name).await
    }

    pub async fn update_permission(&self, id: i32, name: &str) -> StoreResult<Permission> {
        self.permission_repo().update(id, name).await
    }

    pub async fn delete_permission(&self, id: i32) -> StoreResult<bool> {
        self.permission_repo().delete(id).await
    }

    pub async fn ensure_permission(&self, name: &str) -> StoreResult<(Permission, bool)> {
        self.permission_repo().ensure(name).await
    }

    // Categories

    pub async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.category_repo().list().await
    }

    pub async fn get_category(&self, id: i32) -> StoreResult<Option<Category>> {
        self.category_repo().get(id).await
    }

    pub async fn create_category(&self, name: &str) -> StoreResult<Category> {
        self.category_repo().create(name).await
    }

    pub async fn update_category(&self, id: i32, name: &str) -> StoreResult<Category> {
        self.category_repo().update(id, name).await
    }

    pub async fn delete_category(&self, id: i32) -> StoreResult<bool> {
        self.category_repo().delete(id).await
    }
}
