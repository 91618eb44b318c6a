//! Project service.

use makaan_common::{AppError, AppResult, IdGenerator, PageWindow, Paginated};
use makaan_db::{
    entities::{project, user},
    repositories::{
        ProjectFilter, ProjectRepository, ProjectSortKey, UserRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

use super::search::ProjectWithOwner;
use super::visibility::VisibilityService;

/// Input for creating a project.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    #[validate(length(min = 1, max = 64))]
    pub project_type: String,

    #[validate(length(max = 64))]
    pub construction_type: Option<String>,

    #[validate(length(max = 64))]
    pub style: Option<String>,

    #[validate(length(max = 256))]
    pub place: Option<String>,

    #[validate(range(min = 1))]
    pub area_sqft: Option<i32>,

    #[validate(range(min = 0))]
    pub cost: Option<i64>,

    #[validate(length(max = 4096))]
    pub about: Option<String>,
}

/// Input for updating a project. Unset fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub project_type: Option<String>,

    #[validate(length(max = 64))]
    pub construction_type: Option<String>,

    #[validate(length(max = 64))]
    pub style: Option<String>,

    #[validate(length(max = 256))]
    pub place: Option<String>,

    #[validate(range(min = 1))]
    pub area_sqft: Option<i32>,

    #[validate(range(min = 0))]
    pub cost: Option<i64>,

    #[validate(length(max = 4096))]
    pub about: Option<String>,
}

/// Listing query: every filter dimension independently optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub project_type: Option<String>,
    pub construction_type: Option<String>,
    pub style: Option<String>,
    pub place: Option<String>,
    pub min_area_sqft: Option<i32>,
    pub max_area_sqft: Option<i32>,
    pub min_cost: Option<i64>,
    pub max_cost: Option<i64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl ProjectListQuery {
    fn sort_key(&self) -> ProjectSortKey {
        match self.sort_by.as_deref() {
            Some("title") => ProjectSortKey::Title,
            Some("cost") => ProjectSortKey::Cost,
            Some("area") | Some("areaSqft") => ProjectSortKey::AreaSqft,
            _ => ProjectSortKey::CreatedAt,
        }
    }

    fn ascending(&self) -> bool {
        self.order.as_deref() == Some("asc")
    }
}

/// Project service for business logic.
#[derive(Clone)]
pub struct ProjectService {
    project_repo: ProjectRepository,
    user_repo: UserRepository,
    visibility: VisibilityService,
    id_gen: IdGenerator,
}

impl ProjectService {
    /// Create a new project service.
    #[must_use]
    pub const fn new(
        project_repo: ProjectRepository,
        user_repo: UserRepository,
        visibility: VisibilityService,
    ) -> Self {
        Self {
            project_repo,
            user_repo,
            visibility,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a project owned by `owner`.
    pub async fn create(
        &self,
        owner: &user::Model,
        input: CreateProjectInput,
    ) -> AppResult<project::Model> {
        input.validate()?;

        if !owner.role.has_projects() {
            return Err(AppError::Forbidden(
                "Only realtors and professionals can publish projects".to_string(),
            ));
        }

        let model = project::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            project_type: Set(input.project_type),
            construction_type: Set(input.construction_type),
            style: Set(input.style),
            place: Set(input.place),
            area_sqft: Set(input.area_sqft),
            cost: Set(input.cost),
            about: Set(input.about),
            created_by: Set(owner.id.clone()),
            flag_count: Set(0),
            is_violated: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.project_repo.create(model).await
    }

    /// Update a project; only its owner may do so.
    pub async fn update(
        &self,
        owner_id: &str,
        project_id: &str,
        input: UpdateProjectInput,
    ) -> AppResult<project::Model> {
        input.validate()?;

        let existing = self.project_repo.get_by_id(project_id).await?;
        if existing.created_by != owner_id {
            return Err(AppError::Forbidden(
                "Project belongs to another user".to_string(),
            ));
        }

        let mut model: project::ActiveModel = existing.into();
        if let Some(v) = input.title {
            model.title = Set(v);
        }
        if let Some(v) = input.project_type {
            model.project_type = Set(v);
        }
        if let Some(v) = input.construction_type {
            model.construction_type = Set(Some(v));
        }
        if let Some(v) = input.style {
            model.style = Set(Some(v));
        }
        if let Some(v) = input.place {
            model.place = Set(Some(v));
        }
        if let Some(v) = input.area_sqft {
            model.area_sqft = Set(Some(v));
        }
        if let Some(v) = input.cost {
            model.cost = Set(Some(v));
        }
        if let Some(v) = input.about {
            model.about = Set(Some(v));
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.project_repo.update(model).await
    }

    /// Delete a project; only its owner may do so.
    pub async fn delete(&self, owner_id: &str, project_id: &str) -> AppResult<()> {
        let existing = self.project_repo.get_by_id(project_id).await?;
        if existing.created_by != owner_id {
            return Err(AppError::Forbidden(
                "Project belongs to another user".to_string(),
            ));
        }
        self.project_repo.delete(project_id).await
    }

    /// Get a project with its owner populated.
    pub async fn get(&self, id: &str) -> AppResult<ProjectWithOwner> {
        let project = self.project_repo.get_by_id(id).await?;
        let owner = self.user_repo.find_by_id(&project.created_by).await?;
        Ok(ProjectWithOwner { project, owner })
    }

    /// Public listing: typed filters, visibility exclusions, owner
    /// population, metadata from the filtered count.
    pub async fn list(
        &self,
        query: &ProjectListQuery,
        viewer_id: Option<&str>,
        window: PageWindow,
    ) -> AppResult<Paginated<ProjectWithOwner>> {
        let vis = self.visibility.compute(viewer_id).await;

        let filter = ProjectFilter {
            project_type: query.project_type.clone(),
            construction_type: query.construction_type.clone(),
            style: query.style.clone(),
            place: query.place.clone(),
            min_area_sqft: query.min_area_sqft,
            max_area_sqft: query.max_area_sqft,
            min_cost: query.min_cost,
            max_cost: query.max_cost,
            excluded_owner_ids: vis.excluded_owner_ids,
        };

        let (projects, total) = tokio::try_join!(
            self.project_repo.list(
                &filter,
                query.sort_key(),
                query.ascending(),
                window.skip(),
                window.limit
            ),
            self.project_repo.count(&filter),
        )?;

        let owner_ids: Vec<String> = {
            let mut seen = std::collections::HashSet::new();
            projects
                .iter()
                .map(|p| p.created_by.clone())
                .filter(|id| seen.insert(id.clone()))
                .collect()
        };
        let owners: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let populated = projects
            .into_iter()
            .map(|project| {
                let owner = owners.get(&project.created_by).cloned();
                ProjectWithOwner { project, owner }
            })
            .collect();

        Ok(Paginated::assemble(populated, window, total))
    }

    /// The caller's own projects, paginated.
    pub async fn mine(
        &self,
        owner_id: &str,
        window: PageWindow,
    ) -> AppResult<Paginated<project::Model>> {
        let (projects, total) = tokio::try_join!(
            self.project_repo
                .find_by_owner(owner_id, window.skip(), window.limit),
            self.project_repo.count_by_owner(owner_id),
        )?;

        Ok(Paginated::assemble(projects, window, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parsing() {
        let q = ProjectListQuery {
            sort_by: Some("cost".to_string()),
            order: Some("asc".to_string()),
            ..Default::default()
        };
        assert_eq!(q.sort_key(), ProjectSortKey::Cost);
        assert!(q.ascending());
    }

    #[test]
    fn test_sort_defaults_to_created_at_desc() {
        let q = ProjectListQuery::default();
        assert_eq!(q.sort_key(), ProjectSortKey::CreatedAt);
        assert!(!q.ascending());
    }

    #[test]
    fn test_create_input_requires_title() {
        let input = CreateProjectInput {
            title: String::new(),
            project_type: "residential".to_string(),
            construction_type: None,
            style: None,
            place: None,
            area_sqft: None,
            cost: None,
            about: None,
        };
        assert!(input.validate().is_err());
    }
}
