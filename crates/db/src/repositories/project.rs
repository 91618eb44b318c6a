//! Project repository.

use std::sync::Arc;

use crate::entities::{Project, project};
use crate::repositories::matching::any_column_matches;
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Columns consulted by the fuzzy project search.
const SEARCH_COLUMNS: [project::Column; 5] = [
    project::Column::Title,
    project::Column::ProjectType,
    project::Column::ConstructionType,
    project::Column::Style,
    project::Column::Place,
];

/// Typed filter for project listings. Every dimension is independently
/// optional; unset dimensions place no constraint.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub project_type: Option<String>,
    pub construction_type: Option<String>,
    pub style: Option<String>,
    pub place: Option<String>,
    pub min_area_sqft: Option<i32>,
    pub max_area_sqft: Option<i32>,
    pub min_cost: Option<i64>,
    pub max_cost: Option<i64>,
    /// Owners excluded by the viewer's visibility (blocked users).
    pub excluded_owner_ids: Vec<String>,
}

impl ProjectFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all().add(project::Column::IsViolated.eq(false));

        if let Some(ref v) = self.project_type {
            cond = cond.add(project::Column::ProjectType.eq(v));
        }
        if let Some(ref v) = self.construction_type {
            cond = cond.add(project::Column::ConstructionType.eq(v));
        }
        if let Some(ref v) = self.style {
            cond = cond.add(project::Column::Style.eq(v));
        }
        if let Some(ref v) = self.place {
            cond = cond.add(project::Column::Place.eq(v));
        }
        if let Some(v) = self.min_area_sqft {
            cond = cond.add(project::Column::AreaSqft.gte(v));
        }
        if let Some(v) = self.max_area_sqft {
            cond = cond.add(project::Column::AreaSqft.lte(v));
        }
        if let Some(v) = self.min_cost {
            cond = cond.add(project::Column::Cost.gte(v));
        }
        if let Some(v) = self.max_cost {
            cond = cond.add(project::Column::Cost.lte(v));
        }
        if !self.excluded_owner_ids.is_empty() {
            cond = cond.add(project::Column::CreatedBy.is_not_in(self.excluded_owner_ids.clone()));
        }

        cond
    }
}

/// Sortable project listing columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectSortKey {
    #[default]
    CreatedAt,
    Title,
    Cost,
    AreaSqft,
}

impl ProjectSortKey {
    const fn column(self) -> project::Column {
        match self {
            Self::CreatedAt => project::Column::CreatedAt,
            Self::Title => project::Column::Title,
            Self::Cost => project::Column::Cost,
            Self::AreaSqft => project::Column::AreaSqft,
        }
    }
}

/// Project repository for database operations.
#[derive(Clone)]
pub struct ProjectRepository {
    db: Arc<DatabaseConnection>,
}

impl ProjectRepository {
    /// Create a new project repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a project by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<project::Model>> {
        Project::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a project by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<project::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProjectNotFound(id.to_string()))
    }

    /// Create a new project.
    pub async fn create(&self, model: project::ActiveModel) -> AppResult<project::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a project.
    pub async fn update(&self, model: project::ActiveModel) -> AppResult<project::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a project.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if let Some(p) = self.find_by_id(id).await? {
            p.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Public listing through the typed filter (paginated, sorted).
    pub async fn list(
        &self,
        filter: &ProjectFilter,
        sort: ProjectSortKey,
        ascending: bool,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<project::Model>> {
        let order = if ascending { Order::Asc } else { Order::Desc };
        Project::find()
            .filter(filter.condition())
            .order_by(sort.column(), order)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count projects matching the typed filter.
    pub async fn count(&self, filter: &ProjectFilter) -> AppResult<u64> {
        Project::find()
            .filter(filter.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Projects created by one owner (violated ones left out), paginated.
    pub async fn find_by_owner(
        &self,
        owner_id: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<project::Model>> {
        Project::find()
            .filter(project::Column::CreatedBy.eq(owner_id))
            .filter(project::Column::IsViolated.eq(false))
            .order_by_desc(project::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count projects created by one owner.
    pub async fn count_by_owner(&self, owner_id: &str) -> AppResult<u64> {
        Project::find()
            .filter(project::Column::CreatedBy.eq(owner_id))
            .filter(project::Column::IsViolated.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Non-violated projects owned by any of `owner_ids` (join phase of the
    /// search aggregator and the user directory).
    pub async fn find_by_owners(
        &self,
        owner_ids: &[String],
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<project::Model>> {
        if owner_ids.is_empty() {
            return Ok(vec![]);
        }

        Project::find()
            .filter(project::Column::CreatedBy.is_in(owner_ids.to_vec()))
            .filter(project::Column::IsViolated.eq(false))
            .order_by_desc(project::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn search_condition(pattern: &str, excluded_owner_ids: &[String]) -> Condition {
        let mut cond = Condition::all()
            .add(project::Column::IsViolated.eq(false))
            .add(any_column_matches(&SEARCH_COLUMNS, pattern));
        if !excluded_owner_ids.is_empty() {
            cond = cond.add(project::Column::CreatedBy.is_not_in(excluded_owner_ids.to_vec()));
        }
        cond
    }

    /// Fuzzy-search projects.
    pub async fn search(
        &self,
        pattern: &str,
        excluded_owner_ids: &[String],
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<project::Model>> {
        Project::find()
            .filter(Self::search_condition(pattern, excluded_owner_ids))
            .order_by_desc(project::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count projects matching [`Self::search`].
    pub async fn count_search(
        &self,
        pattern: &str,
        excluded_owner_ids: &[String],
    ) -> AppResult<u64> {
        Project::find()
            .filter(Self::search_condition(pattern, excluded_owner_ids))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append one flag's worth of counters atomically (single UPDATE, no
    /// fetch).
    pub async fn register_flag(&self, project_id: &str, threshold: i32) -> AppResult<()> {
        Project::update_many()
            .col_expr(
                project::Column::FlagCount,
                Expr::col(project::Column::FlagCount).add(1),
            )
            .col_expr(
                project::Column::IsViolated,
                Expr::cust_with_values("is_violated OR flag_count + 1 >= ?", [threshold]),
            )
            .filter(project::Column::Id.eq(project_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Reset the moderation counters (single UPDATE, no fetch).
    pub async fn clear_flags(&self, project_id: &str) -> AppResult<()> {
        Project::update_many()
            .col_expr(project::Column::FlagCount, Expr::value(0))
            .col_expr(project::Column::IsViolated, Expr::value(false))
            .filter(project::Column::Id.eq(project_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Projects currently carrying at least one flag (moderation queue).
    pub async fn find_flagged(&self, skip: u64, limit: u64) -> AppResult<Vec<project::Model>> {
        Project::find()
            .filter(project::Column::FlagCount.gt(0))
            .order_by_desc(project::Column::FlagCount)
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

    fn test_project(id: &str, owner: &str) -> project::Model {
        project::Model {
            id: id.to_string(),
            title: "Lakeside villa".to_string(),
            project_type: "residential".to_string(),
            construction_type: Some("new".to_string()),
            style: Some("contemporary".to_string()),
            place: Some("Kochi".to_string()),
            area_sqft: Some(2400),
            cost: Some(4_500_000),
            about: None,
            created_by: owner.to_string(),
            flag_count: 0,
            is_violated: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<project::Model>::new()])
                .into_connection(),
        );

        let repo = ProjectRepository::new(db);
        match repo.get_by_id("missing").await {
            Err(AppError::ProjectNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected ProjectNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_by_owners_short_circuits_on_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ProjectRepository::new(db);
        let result = repo.find_by_owners(&[], 0, 10).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_project("p1", "u1"), test_project("p2", "u2")]])
                .into_connection(),
        );

        let repo = ProjectRepository::new(db);
        let filter = ProjectFilter {
            project_type: Some("residential".to_string()),
            ..Default::default()
        };
        let rows = repo
            .list(&filter, ProjectSortKey::CreatedAt, false, 0, 10)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }
}
