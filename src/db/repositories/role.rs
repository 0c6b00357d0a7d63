use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::db::error::{StoreError, StoreResult};
use crate::entities::{permissions, person_roles, prelude::*, role_permissions, roles};
use crate::models::role::{NewRole, Permission, Role, RoleChanges, RoleDetails};

const NAME_TAKEN: &str = "Role with this name already exists";

pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<RoleDetails>> {
        let models = Roles::find()
            .order_by_asc(roles::Column::Id)
            .all(&self.conn)
            .await?;

        load_details(&self.conn, models).await
    }

    pub async fn get(&self, id: i32) -> StoreResult<Option<RoleDetails>> {
        find_details(&self.conn, id).await
    }

    pub async fn get_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let role = Roles::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.conn)
            .await?;

        Ok(role.map(Role::from))
    }

    pub async fn create(&self, input: NewRole) -> StoreResult<RoleDetails> {
        if self.get_by_name(&input.name).await?.is_some() {
            return Err(StoreError::Conflict(NAME_TAKEN.to_string()));
        }

        let txn = self.conn.begin().await?;

        let role = roles::ActiveModel {
            name: Set(input.name),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| StoreError::from(e).conflict_message(NAME_TAKEN))?;

        let permission_ids = existing_permission_ids(&txn, input.permission_ids).await?;
        insert_edges(&txn, role.id, &permission_ids).await?;

        txn.commit().await?;

        self.require(role.id).await
    }

    pub async fn update(&self, id: i32, changes: RoleChanges) -> StoreResult<RoleDetails> {
        let existing = Roles::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Role", id))?;

        let txn = self.conn.begin().await?;

        if let Some(name) = changes.name
            && name != existing.name
        {
            let taken = Roles::find()
                .filter(roles::Column::Name.eq(name.as_str()))
                .filter(roles::Column::Id.ne(id))
                .one(&txn)
                .await?;
            if taken.is_some() {
                return Err(StoreError::Conflict(NAME_TAKEN.to_string()));
            }

            let mut active: roles::ActiveModel = existing.into();
            active.name = Set(name);
            active
                .update(&txn)
                .await
                .map_err(|e| StoreError::from(e).conflict_message(NAME_TAKEN))?;
        }

        if let Some(ids) = changes.permission_ids {
            let permission_ids = existing_permission_ids(&txn, ids).await?;
            RolePermissions::delete_many()
                .filter(role_permissions::Column::RoleId.eq(id))
                .exec(&txn)
                .await?;
            insert_edges(&txn, id, &permission_ids).await?;
        }

        txn.commit().await?;

        self.require(id).await
    }

    /// Hard delete; person and permission edges go with it.
    pub async fn delete(&self, id: i32) -> StoreResult<bool> {
        let txn = self.conn.begin().await?;

        PersonRoles::delete_many()
            .filter(person_roles::Column::RoleId.eq(id))
            .exec(&txn)
            .await?;
        RolePermissions::delete_many()
            .filter(role_permissions::Column::RoleId.eq(id))
            .exec(&txn)
            .await?;
        let result = Roles::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Attaches a permission. Adding an edge that already exists is a no-op.
    pub async fn add_permission(&self, role_id: i32, permission_id: i32) -> StoreResult<RoleDetails> {
        Roles::find_by_id(role_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Role", role_id))?;

        Permissions::find_by_id(permission_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Permission", permission_id))?;

        let edge = RolePermissions::find_by_id((role_id, permission_id))
            .one(&self.conn)
            .await?;

        if edge.is_none() {
            insert_edges(&self.conn, role_id, &[permission_id]).await?;
        }

        self.require(role_id).await
    }

    /// Detaches a permission. Removing an edge that does not exist succeeds silently.
    pub async fn remove_permission(
        &self,
        role_id: i32,
        permission_id: i32,
    ) -> StoreResult<RoleDetails> {
        Roles::find_by_id(role_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Role", role_id))?;

        RolePermissions::delete_many()
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .filter(role_permissions::Column::PermissionId.eq(permission_id))
            .exec(&self.conn)
            .await?;

        self.require(role_id).await
    }

    /// Returns the role with this name, creating it first if needed.
    /// The bool is true when the role was created by this call.
    pub async fn ensure(&self, name: &str) -> StoreResult<(Role, bool)> {
        if let Some(role) = self.get_by_name(name).await? {
            return Ok((role, false));
        }

        let inserted = roles::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await;

        match inserted {
            Ok(model) => Ok((Role::from(model), true)),
            // Lost a race with a concurrent bootstrap; the row is there now.
            Err(e) => match StoreError::from(e) {
                StoreError::Conflict(_) => self
                    .get_by_name(name)
                    .await?
                    .map(|role| (role, false))
                    .ok_or_else(|| StoreError::Conflict(NAME_TAKEN.to_string())),
                other => Err(other),
            },
        }
    }

    /// Adds edges from the role to each listed permission it does not hold yet.
    /// Returns how many edges were inserted.
    pub async fn attach_missing_permissions(
        &self,
        role_id: i32,
        permission_ids: &[i32],
    ) -> StoreResult<usize> {
        let held: Vec<i32> = RolePermissions::find()
            .filter(role_permissions::Column::RoleId.eq(role_id))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|edge| edge.permission_id)
            .collect();

        let mut missing: Vec<i32> = permission_ids
            .iter()
            .copied()
            .filter(|id| !held.contains(id))
            .collect();
        missing.sort_unstable();
        missing.dedup();

        insert_edges(&self.conn, role_id, &missing).await?;
        Ok(missing.len())
    }

    async fn require(&self, id: i32) -> StoreResult<RoleDetails> {
        find_details(&self.conn, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Role", id))
    }
}

async fn find_details<C>(conn: &C, id: i32) -> StoreResult<Option<RoleDetails>>
where
    C: ConnectionTrait,
{
    let Some(model) = Roles::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };

    Ok(load_details(conn, vec![model]).await?.pop())
}

async fn load_details<C>(conn: &C, models: Vec<roles::Model>) -> StoreResult<Vec<RoleDetails>>
where
    C: ConnectionTrait,
{
    let permissions = models
        .load_many_to_many(Permissions, RolePermissions, conn)
        .await?;

    Ok(models
        .into_iter()
        .zip(permissions)
        .map(|(model, permissions)| {
            let mut permissions: Vec<Permission> =
                permissions.into_iter().map(Permission::from).collect();
            permissions.sort_by_key(|p| p.id);

            RoleDetails {
                role: Role::from(model),
                permissions,
            }
        })
        .collect())
}

/// Keeps only ids that resolve to a permission; unknown ids are dropped.
async fn existing_permission_ids<C>(conn: &C, ids: Vec<i32>) -> StoreResult<Vec<i32>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found = Permissions::find()
        .filter(permissions::Column::Id.is_in(ids))
        .order_by_asc(permissions::Column::Id)
        .all(conn)
        .await?;

    Ok(found.into_iter().map(|p| p.id).collect())
}

async fn insert_edges<C>(conn: &C, role_id: i32, permission_ids: &[i32]) -> StoreResult<()>
where
    C: ConnectionTrait,
{
    if permission_ids.is_empty() {
        return Ok(());
    }

    let edges = permission_ids
        .iter()
        .map(|permission_id| role_permissions::ActiveModel {
            role_id: Set(role_id),
            permission_id: Set(*permission_id),
        });

    RolePermissions::insert_many(edges).exec(conn).await?;
    Ok(())
}
