//! User block repository.

use std::sync::Arc;

use crate::entities::{UserBlock, user_block};
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// User block repository for database operations.
#[derive(Clone)]
pub struct UserBlockRepository {
    db: Arc<DatabaseConnection>,
}

impl UserBlockRepository {
    /// Create a new user block repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a block relationship by blocker and blocked user.
    pub async fn find_by_pair(
        &self,
        user_id: &str,
        blocked_id: &str,
    ) -> AppResult<Option<user_block::Model>> {
        UserBlock::find()
            .filter(user_block::Column::UserId.eq(user_id))
            .filter(user_block::Column::BlockedId.eq(blocked_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether `user_id` has blocked `blocked_id`.
    pub async fn is_blocking(&self, user_id: &str, blocked_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(user_id, blocked_id).await?.is_some())
    }

    /// Create a block relationship.
    pub async fn create(&self, model: user_block::ActiveModel) -> AppResult<user_block::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a block relationship by pair.
    pub async fn delete_by_pair(&self, user_id: &str, blocked_id: &str) -> AppResult<()> {
        if let Some(block) = self.find_by_pair(user_id, blocked_id).await? {
            block
                .delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Ids of every user on `user_id`'s block list.
    ///
    /// This is the visibility filter's exclusion-set lookup, so it selects
    /// the id column only.
    pub async fn blocked_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        UserBlock::find()
            .filter(user_block::Column::UserId.eq(user_id))
            .select_only()
            .column(user_block::Column::BlockedId)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Block list rows for a user (paginated).
    pub async fn find_blocking(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<user_block::Model>> {
        UserBlock::find()
            .filter(user_block::Column::UserId.eq(user_id))
            .order_by_desc(user_block::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count block list rows for a user.
    pub async fn count_blocking(&self, user_id: &str) -> AppResult<u64> {
        UserBlock::find()
            .filter(user_block::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn block_row(user_id: &str, blocked_id: &str) -> user_block::Model {
        user_block::Model {
            id: "b1".to_string(),
            user_id: user_id.to_string(),
            blocked_id: blocked_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_is_blocking_true_when_pair_exists() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[block_row("u1", "u2")]])
                .into_connection(),
        );

        let repo = UserBlockRepository::new(db);
        assert!(repo.is_blocking("u1", "u2").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_blocking_false_when_no_pair() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_block::Model>::new()])
                .into_connection(),
        );

        let repo = UserBlockRepository::new(db);
        assert!(!repo.is_blocking("u1", "u2").await.unwrap());
    }
}
