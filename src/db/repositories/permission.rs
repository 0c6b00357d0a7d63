use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::db::error::{StoreError, StoreResult};
use crate::entities::{permissions, prelude::*, role_permissions};
use crate::models::role::Permission;

const NAME_TAKEN: &str = "Permission with this name already exists";

pub struct PermissionRepository {
    conn: DatabaseConnection,
}

impl PermissionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<Permission>> {
        let rows = Permissions::find()
            .order_by_asc(permissions::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }

    pub async fn get(&self, id: i32) -> StoreResult<Option<Permission>> {
        let row = Permissions::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Permission::from))
    }

    pub async fn get_by_name(&self, name: &str) -> StoreResult<Option<Permission>> {
        let row = Permissions::find()
            .filter(permissions::Column::Name.eq(name))
            .one(&self.conn)
            .await?;

        Ok(row.map(Permission::from))
    }

    pub async fn create(&self, name: &str) -> StoreResult<Permission> {
        if self.get_by_name(name).await?.is_some() {
            return Err(StoreError::Conflict(NAME_TAKEN.to_string()));
        }

        let model = permissions::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .map_err(|e| StoreError::from(e).conflict_message(NAME_TAKEN))?;

        Ok(Permission::from(model))
    }

    pub async fn update(&self, id: i32, name: &str) -> StoreResult<Permission> {
        let existing = Permissions::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Permission", id))?;

        if existing.name == name {
            return Ok(Permission::from(existing));
        }

        if self.get_by_name(name).await?.is_some() {
            return Err(StoreError::Conflict(NAME_TAKEN.to_string()));
        }

        let mut active: permissions::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        let model = active
            .update(&self.conn)
            .await
            .map_err(|e| StoreError::from(e).conflict_message(NAME_TAKEN))?;

        Ok(Permission::from(model))
    }

    pub async fn delete(&self, id: i32) -> StoreResult<bool> {
        let txn = self.conn.begin().await?;

        RolePermissions::delete_many()
            .filter(role_permissions::Column::PermissionId.eq(id))
            .exec(&txn)
            .await?;
        let result = Permissions::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    /// Returns the permission with this name, creating it first if needed.
    pub async fn ensure(&self, name: &str) -> StoreResult<(Permission, bool)> {
        if let Some(permission) = self.get_by_name(name).await? {
            return Ok((permission, false));
        }

        match self.create(name).await {
            Ok(permission) => Ok((permission, true)),
            Err(StoreError::Conflict(_)) => self
                .get_by_name(name)
                .await?
                .map(|p| (p, false))
                .ok_or_else(|| StoreError::Conflict(NAME_TAKEN.to_string())),
            Err(e) => Err(e),
        }
    }
}
