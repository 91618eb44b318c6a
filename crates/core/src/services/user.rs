//! User service.

use makaan_common::{AppError, AppResult, PageWindow, Paginated};
use makaan_db::{
    entities::{product, project, user, user::UserRole},
    repositories::{ProductRepository, ProjectRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::visibility::VisibilityService;

/// A user record with its portfolio attached.
///
/// Realtors and professionals carry `projects`; product sellers carry
/// `products`. The lists are always present, empty when nothing matched.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithListings {
    #[serde(flatten)]
    pub user: user::Model,
    pub projects: Vec<project::Model>,
    pub products: Vec<product::Model>,
}

/// Input for updating a user profile.
///
/// Every field is optional; unset fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub fname: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub lname: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    pub role: Option<UserRole>,

    #[validate(url)]
    pub profile_image: Option<String>,

    #[validate(length(max = 256))]
    pub place: Option<String>,

    #[validate(length(max = 256))]
    pub company_name: Option<String>,

    #[validate(email)]
    pub company_email: Option<String>,

    #[validate(length(max = 20))]
    pub company_phone: Option<String>,

    #[validate(length(max = 32))]
    pub company_gst_number: Option<String>,

    #[validate(length(max = 256))]
    pub company_place: Option<String>,

    #[validate(length(max = 2048))]
    pub company_bio: Option<String>,

    #[validate(range(min = 0, max = 80))]
    pub experience_years: Option<i32>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    project_repo: ProjectRepository,
    product_repo: ProductRepository,
    visibility: VisibilityService,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        project_repo: ProjectRepository,
        product_repo: ProductRepository,
        visibility: VisibilityService,
    ) -> Self {
        Self {
            user_repo,
            project_repo,
            product_repo,
            visibility,
        }
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Update the caller's profile.
    pub async fn update(&self, user_id: &str, input: UpdateProfileInput) -> AppResult<user::Model> {
        input.validate()?;

        // Admin is granted out-of-band, never self-assigned.
        if input.role == Some(UserRole::Admin) {
            return Err(AppError::Forbidden(
                "Cannot assign the admin role".to_string(),
            ));
        }

        let existing = self.user_repo.get_by_id(user_id).await?;
        let mut model: user::ActiveModel = existing.into();

        if let Some(v) = input.fname {
            model.fname = Set(Some(v));
        }
        if let Some(v) = input.lname {
            model.lname = Set(Some(v));
        }
        if let Some(v) = input.email {
            model.email = Set(Some(v));
        }
        if let Some(v) = input.role {
            model.role = Set(v);
        }
        if let Some(v) = input.profile_image {
            model.profile_image = Set(Some(v));
        }
        if let Some(v) = input.place {
            model.place = Set(Some(v));
        }
        if let Some(v) = input.company_name {
            model.company_name = Set(Some(v));
        }
        if let Some(v) = input.company_email {
            model.company_email = Set(Some(v));
        }
        if let Some(v) = input.company_phone {
            model.company_phone = Set(Some(v));
        }
        if let Some(v) = input.company_gst_number {
            model.company_gst_number = Set(Some(v));
        }
        if let Some(v) = input.company_place {
            model.company_place = Set(Some(v));
        }
        if let Some(v) = input.company_bio {
            model.company_bio = Set(Some(v));
        }
        if let Some(v) = input.experience_years {
            model.experience_years = Set(Some(v));
        }
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(model).await
    }

    /// Directory listing by role, each user carrying their portfolio.
    ///
    /// Applies the viewer's visibility, pages over the filtered user set and
    /// batch-fetches the portfolio records for the page.
    pub async fn directory(
        &self,
        roles: &[UserRole],
        viewer_id: Option<&str>,
        window: PageWindow,
    ) -> AppResult<Paginated<UserWithListings>> {
        let vis = self.visibility.compute(viewer_id).await;
        let excluded = &vis.excluded_owner_ids;
        let (skip, limit) = (window.skip(), window.limit);

        let (users, total) = tokio::try_join!(
            self.user_repo.find_directory(roles, excluded, skip, limit),
            self.user_repo.count_directory(roles, excluded),
        )?;

        let portfolio_owner_ids: Vec<String> = users
            .iter()
            .filter(|u| u.role.has_projects())
            .map(|u| u.id.clone())
            .collect();
        let seller_ids: Vec<String> = users
            .iter()
            .filter(|u| u.role.has_products())
            .map(|u| u.id.clone())
            .collect();

        let (projects, products) = tokio::try_join!(
            self.project_repo.find_by_owners(&portfolio_owner_ids, 0, limit),
            self.product_repo.find_by_owners(&seller_ids, 0, limit),
        )?;

        let hits = super::search::group_listings(users, projects, products);
        Ok(Paginated::assemble(hits, window, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_update_input_rejects_bad_email() {
        let input = UpdateProfileInput {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_input_accepts_partial_fields() {
        let input = UpdateProfileInput {
            fname: Some("Asha".to_string()),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
    }
}
