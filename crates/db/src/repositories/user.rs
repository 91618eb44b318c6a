//! User repository.

use std::sync::Arc;

use crate::entities::{User, user, user::UserRole};
use crate::repositories::matching::any_column_matches;
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Columns consulted by the fuzzy user search.
const SEARCH_COLUMNS: [user::Column; 7] = [
    user::Column::Fname,
    user::Column::Lname,
    user::Column::CompanyName,
    user::Column::CompanyPlace,
    user::Column::CompanyPhone,
    user::Column::CompanyEmail,
    user::Column::CompanyGstNumber,
];

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by phone number.
    pub async fn find_by_phone(&self, phone_number: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::PhoneNumber.eq(phone_number))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by bearer token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn search_condition(pattern: &str, excluded_ids: &[String], sellers: bool) -> Condition {
        let mut cond = Condition::all()
            .add(user::Column::IsViolated.eq(false))
            .add(any_column_matches(&SEARCH_COLUMNS, pattern));

        cond = if sellers {
            cond.add(user::Column::Role.eq(UserRole::ProductSeller))
        } else {
            cond.add(user::Column::Role.ne(UserRole::ProductSeller))
                .add(user::Column::Role.ne(UserRole::Admin))
        };

        if !excluded_ids.is_empty() {
            cond = cond.add(user::Column::Id.is_not_in(excluded_ids.to_vec()));
        }

        cond
    }

    /// Fuzzy-search users. `sellers` selects product sellers only; otherwise
    /// sellers (and admin accounts) are left out. Violated users and the
    /// viewer's blocked users never match.
    pub async fn search(
        &self,
        pattern: &str,
        excluded_ids: &[String],
        sellers: bool,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(Self::search_condition(pattern, excluded_ids, sellers))
            .order_by_desc(user::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users matching [`Self::search`].
    pub async fn count_search(
        &self,
        pattern: &str,
        excluded_ids: &[String],
        sellers: bool,
    ) -> AppResult<u64> {
        User::find()
            .filter(Self::search_condition(pattern, excluded_ids, sellers))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn directory_condition(roles: &[UserRole], excluded_ids: &[String]) -> Condition {
        let mut cond = Condition::all().add(user::Column::IsViolated.eq(false));

        if !roles.is_empty() {
            cond = cond.add(user::Column::Role.is_in(roles.iter().copied()));
        }
        if !excluded_ids.is_empty() {
            cond = cond.add(user::Column::Id.is_not_in(excluded_ids.to_vec()));
        }

        cond
    }

    /// Directory listing by role, with visibility exclusions applied.
    pub async fn find_directory(
        &self,
        roles: &[UserRole],
        excluded_ids: &[String],
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(Self::directory_condition(roles, excluded_ids))
            .order_by_desc(user::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users matching [`Self::find_directory`].
    pub async fn count_directory(
        &self,
        roles: &[UserRole],
        excluded_ids: &[String],
    ) -> AppResult<u64> {
        User::find()
            .filter(Self::directory_condition(roles, excluded_ids))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append one flag's worth of counters atomically (single UPDATE, no
    /// fetch): `flag_count` moves up by one and `is_violated` latches as
    /// soon as the post-increment count reaches `threshold`.
    pub async fn register_flag(&self, user_id: &str, threshold: i32) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::FlagCount,
                Expr::col(user::Column::FlagCount).add(1),
            )
            .col_expr(
                user::Column::IsViolated,
                Expr::cust_with_values("is_violated OR flag_count + 1 >= ?", [threshold]),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Reset the moderation counters (single UPDATE, no fetch).
    pub async fn clear_flags(&self, user_id: &str) -> AppResult<()> {
        User::update_many()
            .col_expr(user::Column::FlagCount, Expr::value(0))
            .col_expr(user::Column::IsViolated, Expr::value(false))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Users currently carrying at least one flag (moderation queue).
    pub async fn find_flagged(&self, skip: u64, limit: u64) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::FlagCount.gt(0))
            .order_by_desc(user::Column::FlagCount)
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
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str, phone: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            phone_number: phone.to_string(),
            fname: Some("Asha".to_string()),
            lname: Some("Nair".to_string()),
            email: None,
            role: UserRole::HomeOwner,
            profile_image: None,
            place: None,
            company_name: None,
            company_email: None,
            company_phone: None,
            company_gst_number: None,
            company_place: None,
            company_bio: None,
            experience_years: None,
            token: Some("test_token".to_string()),
            otp_hash: None,
            otp_expires_at: None,
            flag_count: 0,
            is_violated: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let user = create_test_user("user1", "9876500001");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_id("user1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().phone_number, "9876500001");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("nonexistent").await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_token() {
        let user = create_test_user("user1", "9876500001");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.find_by_token("test_token").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().token, Some("test_token".to_string()));
    }

    #[tokio::test]
    async fn test_find_by_ids_short_circuits_on_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let result = repo.find_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_register_flag_issues_single_update() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        repo.register_flag("user1", 5).await.unwrap();
    }
}
