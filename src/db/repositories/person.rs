use std::collections::HashMap;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::constants;
use crate::db::error::{StoreError, StoreResult};
use crate::entities::{categories, person_roles, persons, prelude::*, roles};
use crate::models::category::Category;
use crate::models::person::{NewPerson, Person, PersonChanges, PersonDetails};
use crate::models::role::Role;

const EMAIL_TAKEN: &str = "Person with this email already exists";

pub struct PersonRepository {
    conn: DatabaseConnection,
    security: SecurityConfig,
}

impl PersonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, security: SecurityConfig) -> Self {
        Self { conn, security }
    }

    pub async fn list(&self) -> StoreResult<Vec<PersonDetails>> {
        let models = Persons::find()
            .order_by_asc(persons::Column::Id)
            .all(&self.conn)
            .await?;

        load_details(&self.conn, models).await
    }

    pub async fn get(&self, id: i32) -> StoreResult<Option<PersonDetails>> {
        find_details(&self.conn, id).await
    }

    /// Get person by email together with the stored hash (for login only)
    pub async fn get_by_email_with_password(
        &self,
        email: &str,
    ) -> StoreResult<Option<(Person, String)>> {
        let person = Persons::find()
            .filter(persons::Column::Email.eq(email))
            .one(&self.conn)
            .await?;

        Ok(person.map(|p| {
            let password_hash = p.password_hash.clone();
            (Person::from(p), password_hash)
        }))
    }

    pub async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let person = Persons::find()
            .filter(persons::Column::Email.eq(email))
            .one(&self.conn)
            .await?;

        Ok(person.is_some())
    }

    /// Creates a person and its role edges in one transaction.
    /// Without explicit roles the sentinel `user` role is attached.
    pub async fn create(&self, input: NewPerson) -> StoreResult<PersonDetails> {
        if self.email_exists(&input.email).await? {
            return Err(StoreError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password = input.password;
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .map_err(|e| StoreError::Hashing(format!("hashing task panicked: {e}")))??;

        let txn = self.conn.begin().await?;

        if let Some(category_id) = input.category_id {
            ensure_category(&txn, category_id).await?;
        }

        let now = chrono::Utc::now().to_rfc3339();
        let model = persons::ActiveModel {
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            picture: Set(input.picture),
            biometric_fingerprint: Set(input.biometric_fingerprint),
            category_id: Set(input.category_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| StoreError::from(e).conflict_message(EMAIL_TAKEN))?;

        let role_ids = match input.role_ids {
            Some(ids) if !ids.is_empty() => existing_role_ids(&txn, ids).await?,
            _ => Roles::find()
                .filter(roles::Column::Name.eq(constants::roles::USER))
                .one(&txn)
                .await?
                .map(|role| vec![role.id])
                .unwrap_or_default(),
        };

        insert_edges(&txn, model.id, &role_ids).await?;
        txn.commit().await?;

        self.require(model.id).await
    }

    /// Applies the supplied fields; absent fields are left untouched.
    pub async fn update(&self, id: i32, changes: PersonChanges) -> StoreResult<PersonDetails> {
        let existing = Persons::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Person", id))?;

        let password_hash = match changes.password {
            Some(password) => {
                let security = self.security.clone();
                let hash = task::spawn_blocking(move || hash_password(&password, &security))
                    .await
                    .map_err(|e| StoreError::Hashing(format!("hashing task panicked: {e}")))??;
                Some(hash)
            }
            None => None,
        };

        let txn = self.conn.begin().await?;

        if let Some(email) = &changes.email
            && email != &existing.email
        {
            let taken = Persons::find()
                .filter(persons::Column::Email.eq(email.as_str()))
                .filter(persons::Column::Id.ne(id))
                .one(&txn)
                .await?;
            if taken.is_some() {
                return Err(StoreError::Conflict(EMAIL_TAKEN.to_string()));
            }
        }

        if let Some(category_id) = changes.category_id {
            ensure_category(&txn, category_id).await?;
        }

        let mut active: persons::ActiveModel = existing.into();
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(hash) = password_hash {
            active.password_hash = Set(hash);
        }
        if let Some(picture) = changes.picture {
            active.picture = Set(Some(picture));
        }
        if let Some(fingerprint) = changes.biometric_fingerprint {
            active.biometric_fingerprint = Set(Some(fingerprint));
        }
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(Some(category_id));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active
            .update(&txn)
            .await
            .map_err(|e| StoreError::from(e).conflict_message(EMAIL_TAKEN))?;

        if let Some(ids) = changes.role_ids {
            let role_ids = existing_role_ids(&txn, ids).await?;
            PersonRoles::delete_many()
                .filter(person_roles::Column::PersonId.eq(id))
                .exec(&txn)
                .await?;
            insert_edges(&txn, id, &role_ids).await?;
        }

        txn.commit().await?;

        self.require(id).await
    }

    /// Hard delete. Returns false when no such person existed.
    pub async fn delete(&self, id: i32) -> StoreResult<bool> {
        let txn = self.conn.begin().await?;

        PersonRoles::delete_many()
            .filter(person_roles::Column::PersonId.eq(id))
            .exec(&txn)
            .await?;
        let result = Persons::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Attaches a role. Adding an edge that already exists is a no-op.
    pub async fn add_role(&self, person_id: i32, role_id: i32) -> StoreResult<PersonDetails> {
        Persons::find_by_id(person_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Person", person_id))?;

        Roles::find_by_id(role_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Role", role_id))?;

        let edge = PersonRoles::find_by_id((person_id, role_id))
            .one(&self.conn)
            .await?;

        if edge.is_none() {
            insert_edges(&self.conn, person_id, &[role_id]).await?;
        }

        self.require(person_id).await
    }

    /// Detaches a role. Removing an edge that does not exist succeeds silently.
    pub async fn remove_role(&self, person_id: i32, role_id: i32) -> StoreResult<PersonDetails> {
        Persons::find_by_id(person_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Person", person_id))?;

        PersonRoles::delete_many()
            .filter(person_roles::Column::PersonId.eq(person_id))
            .filter(person_roles::Column::RoleId.eq(role_id))
            .exec(&self.conn)
            .await?;

        self.require(person_id).await
    }

    async fn require(&self, id: i32) -> StoreResult<PersonDetails> {
        find_details(&self.conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Person", id))
    }
}

async fn find_details<C>(conn: &C, id: i32) -> StoreResult<Option<PersonDetails>>
where
    C: ConnectionTrait,
{
    let Some(model) = Persons::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };

    Ok(load_details(conn, vec![model]).await?.pop())
}

async fn load_details<C>(conn: &C, models: Vec<persons::Model>) -> StoreResult<Vec<PersonDetails>>
where
    C: ConnectionTrait,
{
    let roles = models.load_many_to_many(Roles, PersonRoles, conn).await?;

    let category_ids: Vec<i32> = models.iter().filter_map(|m| m.category_id).collect();
    let categories: HashMap<i32, Category> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        Categories::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| (c.id, Category::from(c)))
            .collect()
    };

    Ok(models
        .into_iter()
        .zip(roles)
        .map(|(model, roles)| {
            let category = model
                .category_id
                .and_then(|id| categories.get(&id).cloned());
            let mut roles: Vec<Role> = roles.into_iter().map(Role::from).collect();
            roles.sort_by_key(|r| r.id);

            PersonDetails {
                person: Person::from(model),
                category,
                roles,
            }
        })
        .collect())
}

async fn ensure_category<C>(conn: &C, category_id: i32) -> StoreResult<()>
where
    C: ConnectionTrait,
{
    Categories::find_by_id(category_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| StoreError::not_found("Category", category_id))
}

/// Keeps only ids that resolve to a role; unknown ids are dropped.
async fn existing_role_ids<C>(conn: &C, ids: Vec<i32>) -> StoreResult<Vec<i32>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found = Roles::find()
        .filter(roles::Column::Id.is_in(ids))
        .order_by_asc(roles::Column::Id)
        .all(conn)
        .await?;

    Ok(found.into_iter().map(|r| r.id).collect())
}

async fn insert_edges<C>(conn: &C, person_id: i32, role_ids: &[i32]) -> StoreResult<()>
where
    C: ConnectionTrait,
{
    if role_ids.is_empty() {
        return Ok(());
    }

    let edges = role_ids.iter().map(|role_id| person_roles::ActiveModel {
        person_id: Set(person_id),
        role_id: Set(*role_id),
    });

    PersonRoles::insert_many(edges).exec(conn).await?;
    Ok(())
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| StoreError::Hashing(format!("Invalid Argon2 params: {e}")))?;

    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Hashing(e.to_string()))
}

/// Checks a password against a stored PHC hash string.
pub fn verify_password_hash(password_hash: &str, password: &str) -> StoreResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| StoreError::Hashing(format!("Invalid password hash format: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
