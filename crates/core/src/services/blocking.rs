//! Blocking service.

use makaan_common::{AppError, AppResult, IdGenerator, PageWindow, Paginated};
use makaan_db::{
    entities::{user, user_block},
    repositories::{UserBlockRepository, UserRepository},
};
use sea_orm::Set;

/// Blocking service for business logic.
#[derive(Clone)]
pub struct BlockingService {
    block_repo: UserBlockRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl BlockingService {
    /// Create a new blocking service.
    #[must_use]
    pub const fn new(block_repo: UserBlockRepository, user_repo: UserRepository) -> Self {
        Self {
            block_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Block a user.
    pub async fn block(&self, user_id: &str, blocked_id: &str) -> AppResult<user_block::Model> {
        // Cannot block yourself
        if user_id == blocked_id {
            return Err(AppError::BadRequest("Cannot block yourself".to_string()));
        }

        // Target must exist
        self.user_repo.get_by_id(blocked_id).await?;

        // Check if already blocking
        if self.block_repo.is_blocking(user_id, blocked_id).await? {
            return Err(AppError::Conflict("Already blocking this user".to_string()));
        }

        let model = user_block::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            blocked_id: Set(blocked_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.block_repo.create(model).await
    }

    /// Unblock a user.
    pub async fn unblock(&self, user_id: &str, blocked_id: &str) -> AppResult<()> {
        if !self.block_repo.is_blocking(user_id, blocked_id).await? {
            return Err(AppError::NotFound("Not blocking this user".to_string()));
        }

        self.block_repo.delete_by_pair(user_id, blocked_id).await
    }

    /// The caller's block list, with the blocked users populated.
    pub async fn list(
        &self,
        user_id: &str,
        window: PageWindow,
    ) -> AppResult<Paginated<user::Model>> {
        let (rows, total) = tokio::try_join!(
            self.block_repo
                .find_blocking(user_id, window.skip(), window.limit),
            self.block_repo.count_blocking(user_id),
        )?;

        let blocked_ids: Vec<String> = rows.into_iter().map(|r| r.blocked_id).collect();
        let users = self.user_repo.find_by_ids(&blocked_ids).await?;

        Ok(Paginated::assemble(users, window, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_block_rejects_self() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = BlockingService::new(
            UserBlockRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        );

        let result = service.block("u1", "u1").await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_block_rejects_unknown_target() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<makaan_db::entities::user::Model>::new()])
                .into_connection(),
        );
        let service = BlockingService::new(
            UserBlockRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        );

        let result = service.block("u1", "ghost").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
