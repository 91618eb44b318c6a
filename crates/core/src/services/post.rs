//! Post service.

use makaan_common::{AppError, AppResult, IdGenerator, PageWindow, Paginated};
use makaan_db::{entities::post, repositories::PostRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::visibility::VisibilityService;

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 4096))]
    pub caption: String,

    #[validate(url)]
    pub image_url: Option<String>,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    visibility: VisibilityService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, visibility: VisibilityService) -> Self {
        Self {
            post_repo,
            visibility,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            caption: Set(input.caption),
            image_url: Set(input.image_url),
            created_by: Set(author_id.to_string()),
            flag_count: Set(0),
            is_violated: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.post_repo.create(model).await
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Delete a post; only its author may do so.
    pub async fn delete(&self, author_id: &str, post_id: &str) -> AppResult<()> {
        let existing = self.post_repo.get_by_id(post_id).await?;
        if existing.created_by != author_id {
            return Err(AppError::Forbidden(
                "Post belongs to another user".to_string(),
            ));
        }
        self.post_repo.delete(post_id).await
    }

    /// Public feed with the viewer's visibility applied.
    pub async fn feed(
        &self,
        viewer_id: Option<&str>,
        window: PageWindow,
    ) -> AppResult<Paginated<post::Model>> {
        let vis = self.visibility.compute(viewer_id).await;

        let (posts, total) = tokio::try_join!(
            self.post_repo
                .find_feed(&vis.excluded_owner_ids, window.skip(), window.limit),
            self.post_repo.count_feed(&vis.excluded_owner_ids),
        )?;

        Ok(Paginated::assemble(posts, window, total))
    }

    /// The caller's own posts, paginated.
    pub async fn mine(
        &self,
        author_id: &str,
        window: PageWindow,
    ) -> AppResult<Paginated<post::Model>> {
        let (posts, total) = tokio::try_join!(
            self.post_repo
                .find_by_owner(author_id, window.skip(), window.limit),
            self.post_repo.count_by_owner(author_id),
        )?;

        Ok(Paginated::assemble(posts, window, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_rejects_empty_caption() {
        let input = CreatePostInput {
            caption: String::new(),
            image_url: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_input_rejects_bad_image_url() {
        let input = CreatePostInput {
            caption: "New site kickoff".to_string(),
            image_url: Some("not a url".to_string()),
        };
        assert!(input.validate().is_err());
    }
}
