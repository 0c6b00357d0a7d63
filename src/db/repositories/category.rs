use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::error::{StoreError, StoreResult};
use crate::entities::{categories, prelude::*};
use crate::models::category::Category;

const NAME_TAKEN: &str = "Category with this name already exists";

pub struct CategoryRepository {
    conn: DatabaseConnection,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<Category>> {
        let rows = Categories::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn get(&self, id: i32) -> StoreResult<Option<Category>> {
        let row = Categories::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(Category::from))
    }

    async fn name_taken(&self, name: &str) -> StoreResult<bool> {
        let row = Categories::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.conn)
            .await?;

        Ok(row.is_some())
    }

    pub async fn create(&self, name: &str) -> StoreResult<Category> {
        if self.name_taken(name).await? {
            return Err(StoreError::Conflict(NAME_TAKEN.to_string()));
        }

        let model = categories::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .map_err(|e| StoreError::from(e).conflict_message(NAME_TAKEN))?;

        Ok(Category::from(model))
    }

    pub async fn update(&self, id: i32, name: &str) -> StoreResult<Category> {
        let existing = Categories::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("Category", id))?;

        if existing.name == name {
            return Ok(Category::from(existing));
        }

        if self.name_taken(name).await? {
            return Err(StoreError::Conflict(NAME_TAKEN.to_string()));
        }

        let mut active: categories::ActiveModel = existing.into();
        active.name = Set(name.to_string());
        let model = active
            .update(&self.conn)
            .await
            .map_err(|e| StoreError::from(e).conflict_message(NAME_TAKEN))?;

        Ok(Category::from(model))
    }

    /// Persons still pointing at a deleted category keep the stale id.
    pub async fn delete(&self, id: i32) -> StoreResult<bool> {
        let result = Categories::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
