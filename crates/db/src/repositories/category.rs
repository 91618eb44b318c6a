//! Category repository.

use std::sync::Arc;

use crate::entities::{Category, category};
use crate::repositories::matching::regex_match;
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a category by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<category::Model>> {
        Category::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new category.
    pub async fn create(&self, model: category::ActiveModel) -> AppResult<category::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All categories, alphabetically.
    pub async fn find_all(&self) -> AppResult<Vec<category::Model>> {
        Category::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fuzzy-search categories by name.
    pub async fn search(
        &self,
        pattern: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<category::Model>> {
        Category::find()
            .filter(regex_match(category::Column::Name, pattern))
            .order_by_asc(category::Column::Name)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count categories matching [`Self::search`].
    pub async fn count_search(&self, pattern: &str) -> AppResult<u64> {
        Category::find()
            .filter(regex_match(category::Column::Name, pattern))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
