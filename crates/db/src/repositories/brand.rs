//! Brand repository.

use std::sync::Arc;

use crate::entities::{Brand, brand};
use crate::repositories::matching::regex_match;
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Brand repository for database operations.
#[derive(Clone)]
pub struct BrandRepository {
    db: Arc<DatabaseConnection>,
}

impl BrandRepository {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a brand by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<brand::Model>> {
        Brand::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find brands by IDs (reference population for product listings).
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<brand::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Brand::find()
            .filter(brand::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a brand by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<brand::Model>> {
        Brand::find()
            .filter(brand::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new brand.
    pub async fn create(&self, model: brand::ActiveModel) -> AppResult<brand::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All brands, alphabetically.
    pub async fn find_all(&self) -> AppResult<Vec<brand::Model>> {
        Brand::find()
            .order_by_asc(brand::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fuzzy-search brands by name.
    pub async fn search(
        &self,
        pattern: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<brand::Model>> {
        Brand::find()
            .filter(regex_match(brand::Column::Name, pattern))
            .order_by_asc(brand::Column::Name)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count brands matching [`Self::search`].
    pub async fn count_search(&self, pattern: &str) -> AppResult<u64> {
        Brand::find()
            .filter(regex_match(brand::Column::Name, pattern))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
