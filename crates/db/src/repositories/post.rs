//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if let Some(p) = self.find_by_id(id).await? {
            p.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    fn feed_condition(excluded_owner_ids: &[String]) -> Condition {
        let mut cond = Condition::all().add(post::Column::IsViolated.eq(false));
        if !excluded_owner_ids.is_empty() {
            cond = cond.add(post::Column::CreatedBy.is_not_in(excluded_owner_ids.to_vec()));
        }
        cond
    }

    /// Public feed, newest first, with visibility exclusions applied.
    pub async fn find_feed(
        &self,
        excluded_owner_ids: &[String],
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(Self::feed_condition(excluded_owner_ids))
            .order_by_desc(post::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts visible in the feed.
    pub async fn count_feed(&self, excluded_owner_ids: &[String]) -> AppResult<u64> {
        Post::find()
            .filter(Self::feed_condition(excluded_owner_ids))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts created by one owner, paginated.
    pub async fn find_by_owner(
        &self,
        owner_id: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::CreatedBy.eq(owner_id))
            .filter(post::Column::IsViolated.eq(false))
            .order_by_desc(post::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts created by one owner.
    pub async fn count_by_owner(&self, owner_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::CreatedBy.eq(owner_id))
            .filter(post::Column::IsViolated.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append one flag's worth of counters atomically (single UPDATE, no
    /// fetch).
    pub async fn register_flag(&self, post_id: &str, threshold: i32) -> AppResult<()> {
        Post::update_many()
            .col_expr(
                post::Column::FlagCount,
                Expr::col(post::Column::FlagCount).add(1),
            )
            .col_expr(
                post::Column::IsViolated,
                Expr::cust_with_values("is_violated OR flag_count + 1 >= ?", [threshold]),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Reset the moderation counters (single UPDATE, no fetch).
    pub async fn clear_flags(&self, post_id: &str) -> AppResult<()> {
        Post::update_many()
            .col_expr(post::Column::FlagCount, Expr::value(0))
            .col_expr(post::Column::IsViolated, Expr::value(false))
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Posts currently carrying at least one flag (moderation queue).
    pub async fn find_flagged(&self, skip: u64, limit: u64) -> AppResult<Vec<post::Model>> {
        Post::find()
            .filter(post::Column::FlagCount.gt(0))
            .order_by_desc(post::Column::FlagCount)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
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

    fn test_post(id: &str, owner: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            caption: "Site progress, week 12".to_string(),
            image_url: None,
            created_by: owner.to_string(),
            flag_count: 0,
            is_violated: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        match repo.get_by_id("missing").await {
            Err(AppError::PostNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected PostNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_feed_returns_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post("po1", "u1")]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let rows = repo
            .find_feed(&["blocked-user".to_string()], 0, 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
