//! Flag repository.

use std::sync::Arc;

use crate::entities::{Flag, flag, flag::FlagTargetType};
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Flag repository for database operations.
#[derive(Clone)]
pub struct FlagRepository {
    db: Arc<DatabaseConnection>,
}

impl FlagRepository {
    /// Create a new flag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Whether `flagged_by` has already flagged the given target.
    pub async fn exists(
        &self,
        flagged_by: &str,
        target_type: FlagTargetType,
        target_id: &str,
    ) -> AppResult<bool> {
        let count = Flag::find()
            .filter(flag::Column::FlaggedBy.eq(flagged_by))
            .filter(flag::Column::TargetType.eq(target_type))
            .filter(flag::Column::TargetId.eq(target_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a flag record.
    pub async fn create(&self, model: flag::ActiveModel) -> AppResult<flag::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All flags raised against one target, newest first.
    pub async fn find_for_target(
        &self,
        target_type: FlagTargetType,
        target_id: &str,
    ) -> AppResult<Vec<flag::Model>> {
        Flag::find()
            .filter(flag::Column::TargetType.eq(target_type))
            .filter(flag::Column::TargetId.eq(target_id))
            .order_by_desc(flag::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count flags raised against one target.
    pub async fn count_for_target(
        &self,
        target_type: FlagTargetType,
        target_id: &str,
    ) -> AppResult<u64> {
        Flag::find()
            .filter(flag::Column::TargetType.eq(target_type))
            .filter(flag::Column::TargetId.eq(target_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every flag raised against one target (administrative clear).
    pub async fn delete_for_target(
        &self,
        target_type: FlagTargetType,
        target_id: &str,
    ) -> AppResult<()> {
        Flag::delete_many()
            .filter(flag::Column::TargetType.eq(target_type))
            .filter(flag::Column::TargetId.eq(target_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_exists_false_on_zero_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .into_connection(),
        );

        let repo = FlagRepository::new(db);
        let exists = repo
            .exists("u1", FlagTargetType::Project, "p1")
            .await
            .unwrap();
        assert!(!exists);
    }

    #[tokio::test]
    async fn test_exists_true_on_positive_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let repo = FlagRepository::new(db);
        let exists = repo
            .exists("u1", FlagTargetType::Project, "p1")
            .await
            .unwrap();
        assert!(exists);
    }
}
