//! Moderation service: flag handling and the violation threshold.
//!
//! Flags are one-per-(actor, target), enforced the same way for every
//! target type. Counter updates are single atomic UPDATE statements so two
//! concurrent flaggers can never lose an increment; `is_violated` latches
//! inside the same statement the moment the post-increment count reaches
//! [`FLAG_THRESHOLD`].

use makaan_common::{AppError, AppResult, IdGenerator};
use makaan_db::{
    entities::flag,
    repositories::{
        FlagRepository, PostRepository, ProductRepository, ProjectRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Serialize;

pub use makaan_db::entities::flag::FlagTargetType;

/// Number of independent flags at which an entity is marked violated.
pub const FLAG_THRESHOLD: i32 = 5;

/// Longest accepted flag reason.
const MAX_REASON_LEN: usize = 2000;

/// Input for raising a flag.
pub struct FlagInput {
    pub target_type: FlagTargetType,
    pub target_id: String,
    pub reason: String,
}

/// Moderation state of one entity after a flag mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagState {
    pub target_type: FlagTargetType,
    pub target_id: String,
    pub flag_count: i32,
    pub is_violated: bool,
}

/// Moderation service for flags and administrative clears.
#[derive(Clone)]
pub struct ModerationService {
    flag_repo: FlagRepository,
    user_repo: UserRepository,
    project_repo: ProjectRepository,
    post_repo: PostRepository,
    product_repo: ProductRepository,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        flag_repo: FlagRepository,
        user_repo: UserRepository,
        project_repo: ProjectRepository,
        post_repo: PostRepository,
        product_repo: ProductRepository,
    ) -> Self {
        Self {
            flag_repo,
            user_repo,
            project_repo,
            post_repo,
            product_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Raise a flag against an entity.
    ///
    /// Fails with `DuplicateFlag` if this actor has already flagged this
    /// target, with `BadRequest` on an empty or oversized reason, and with
    /// the target's not-found variant if the id does not resolve.
    pub async fn flag(&self, actor_id: &str, input: FlagInput) -> AppResult<FlagState> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest("Flag reason is required".to_string()));
        }
        if reason.len() > MAX_REASON_LEN {
            return Err(AppError::BadRequest("Flag reason too long".to_string()));
        }

        if input.target_type == FlagTargetType::User && actor_id == input.target_id {
            return Err(AppError::BadRequest("Cannot flag yourself".to_string()));
        }

        // Target must resolve before anything is written.
        self.ensure_target_exists(input.target_type, &input.target_id)
            .await?;

        if self
            .flag_repo
            .exists(actor_id, input.target_type, &input.target_id)
            .await?
        {
            return Err(AppError::DuplicateFlag(input.target_id));
        }

        let model = flag::ActiveModel {
            id: Set(self.id_gen.generate()),
            target_type: Set(input.target_type),
            target_id: Set(input.target_id.clone()),
            flagged_by: Set(actor_id.to_string()),
            reason: Set(reason.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.flag_repo.create(model).await?;

        // Single atomic UPDATE: increment and latch is_violated together.
        match input.target_type {
            FlagTargetType::User => {
                self.user_repo
                    .register_flag(&input.target_id, FLAG_THRESHOLD)
                    .await?;
            }
            FlagTargetType::Project => {
                self.project_repo
                    .register_flag(&input.target_id, FLAG_THRESHOLD)
                    .await?;
            }
            FlagTargetType::Post => {
                self.post_repo
                    .register_flag(&input.target_id, FLAG_THRESHOLD)
                    .await?;
            }
            FlagTargetType::Product => {
                self.product_repo
                    .register_flag(&input.target_id, FLAG_THRESHOLD)
                    .await?;
            }
        }

        self.flag_state(input.target_type, &input.target_id).await
    }

    /// Clear every flag on an entity and reset its counters.
    ///
    /// Safe to call on an already-clear entity. Callers are responsible for
    /// gating this behind moderator privileges.
    pub async fn clear_flags(
        &self,
        target_type: FlagTargetType,
        target_id: &str,
    ) -> AppResult<FlagState> {
        self.ensure_target_exists(target_type, target_id).await?;

        self.flag_repo
            .delete_for_target(target_type, target_id)
            .await?;

        match target_type {
            FlagTargetType::User => self.user_repo.clear_flags(target_id).await?,
            FlagTargetType::Project => self.project_repo.clear_flags(target_id).await?,
            FlagTargetType::Post => self.post_repo.clear_flags(target_id).await?,
            FlagTargetType::Product => self.product_repo.clear_flags(target_id).await?,
        }

        self.flag_state(target_type, target_id).await
    }

    /// Flags raised against one target, newest first (moderator review).
    pub async fn flags_for(
        &self,
        target_type: FlagTargetType,
        target_id: &str,
    ) -> AppResult<Vec<flag::Model>> {
        self.flag_repo.find_for_target(target_type, target_id).await
    }

    /// Posts carrying at least one flag (moderation queue).
    pub async fn flagged_posts(
        &self,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<makaan_db::entities::post::Model>> {
        self.post_repo.find_flagged(skip, limit).await
    }

    /// Projects carrying at least one flag (moderation queue).
    pub async fn flagged_projects(
        &self,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<makaan_db::entities::project::Model>> {
        self.project_repo.find_flagged(skip, limit).await
    }

    /// Users carrying at least one flag (moderation queue).
    pub async fn flagged_users(
        &self,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<makaan_db::entities::user::Model>> {
        self.user_repo.find_flagged(skip, limit).await
    }

    async fn ensure_target_exists(
        &self,
        target_type: FlagTargetType,
        target_id: &str,
    ) -> AppResult<()> {
        match target_type {
            FlagTargetType::User => {
                self.user_repo.get_by_id(target_id).await?;
            }
            FlagTargetType::Project => {
                self.project_repo.get_by_id(target_id).await?;
            }
            FlagTargetType::Post => {
                self.post_repo.get_by_id(target_id).await?;
            }
            FlagTargetType::Product => {
                self.product_repo.get_by_id(target_id).await?;
            }
        }
        Ok(())
    }

    async fn flag_state(
        &self,
        target_type: FlagTargetType,
        target_id: &str,
    ) -> AppResult<FlagState> {
        let (flag_count, is_violated) = match target_type {
            FlagTargetType::User => {
                let u = self.user_repo.get_by_id(target_id).await?;
                (u.flag_count, u.is_violated)
            }
            FlagTargetType::Project => {
                let p = self.project_repo.get_by_id(target_id).await?;
                (p.flag_count, p.is_violated)
            }
            FlagTargetType::Post => {
                let p = self.post_repo.get_by_id(target_id).await?;
                (p.flag_count, p.is_violated)
            }
            FlagTargetType::Product => {
                let p = self.product_repo.get_by_id(target_id).await?;
                (p.flag_count, p.is_violated)
            }
        };

        Ok(FlagState {
            target_type,
            target_id: target_id.to_string(),
            flag_count,
            is_violated,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use makaan_db::entities::project;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn repos(
        db: &Arc<sea_orm::DatabaseConnection>,
    ) -> (
        FlagRepository,
        UserRepository,
        ProjectRepository,
        PostRepository,
        ProductRepository,
    ) {
        (
            FlagRepository::new(Arc::clone(db)),
            UserRepository::new(Arc::clone(db)),
            ProjectRepository::new(Arc::clone(db)),
            PostRepository::new(Arc::clone(db)),
            ProductRepository::new(Arc::clone(db)),
        )
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }
    }

    fn test_project(id: &str, flag_count: i32, is_violated: bool) -> project::Model {
        project::Model {
            id: id.to_string(),
            title: "Hillside house".to_string(),
            project_type: "residential".to_string(),
            construction_type: None,
            style: None,
            place: None,
            area_sqft: None,
            cost: None,
            about: None,
            created_by: "owner1".to_string(),
            flag_count,
            is_violated,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_flag_rejects_empty_reason() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let (f, u, pr, po, pd) = repos(&db);
        let service = ModerationService::new(f, u, pr, po, pd);

        let result = service
            .flag(
                "actor1",
                FlagInput {
                    target_type: FlagTargetType::Project,
                    target_id: "p1".to_string(),
                    reason: "   ".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_flag_rejects_self_flag() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let (f, u, pr, po, pd) = repos(&db);
        let service = ModerationService::new(f, u, pr, po, pd);

        let result = service
            .flag(
                "actor1",
                FlagInput {
                    target_type: FlagTargetType::User,
                    target_id: "actor1".to_string(),
                    reason: "spam".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_flag_rejects_duplicate_from_same_actor() {
        // Queries, in order: project fetch, duplicate-check count.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_project("p1", 1, false)]])
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );
        let (f, u, pr, po, pd) = repos(&db);
        let service = ModerationService::new(f, u, pr, po, pd);

        let result = service
            .flag(
                "actor1",
                FlagInput {
                    target_type: FlagTargetType::Project,
                    target_id: "p1".to_string(),
                    reason: "spam".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::DuplicateFlag(_))));
    }

    #[tokio::test]
    async fn test_flag_missing_target_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<project::Model>::new()])
                .into_connection(),
        );
        let (f, u, pr, po, pd) = repos(&db);
        let service = ModerationService::new(f, u, pr, po, pd);

        let result = service
            .flag(
                "actor1",
                FlagInput {
                    target_type: FlagTargetType::Project,
                    target_id: "missing".to_string(),
                    reason: "spam".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ProjectNotFound(_))));
    }

    #[tokio::test]
    async fn test_fifth_flag_reports_violated() {
        // Queries: target fetch, duplicate-check count (0), flag insert,
        // counter update, state re-fetch showing the latched violation.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_project("p1", 4, false)]])
                .append_query_results([[count_row(0)]])
                .append_query_results([[makaan_db::entities::flag::Model {
                    id: "f5".to_string(),
                    target_type: FlagTargetType::Project,
                    target_id: "p1".to_string(),
                    flagged_by: "actor5".to_string(),
                    reason: "spam".to_string(),
                    created_at: Utc::now().into(),
                }]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .append_query_results([[test_project("p1", 5, true)]])
                .into_connection(),
        );
        let (f, u, pr, po, pd) = repos(&db);
        let service = ModerationService::new(f, u, pr, po, pd);

        let state = service
            .flag(
                "actor5",
                FlagInput {
                    target_type: FlagTargetType::Project,
                    target_id: "p1".to_string(),
                    reason: "spam".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(state.flag_count, 5);
        assert!(state.is_violated);
    }

    #[tokio::test]
    async fn test_clear_flags_resets_state() {
        // Queries: target fetch, flag delete, counter reset, state re-fetch.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_project("p1", 5, true)]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 5,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .append_query_results([[test_project("p1", 0, false)]])
                .into_connection(),
        );
        let (f, u, pr, po, pd) = repos(&db);
        let service = ModerationService::new(f, u, pr, po, pd);

        let state = service
            .clear_flags(FlagTargetType::Project, "p1")
            .await
            .unwrap();

        assert_eq!(state.flag_count, 0);
        assert!(!state.is_violated);
    }
}
