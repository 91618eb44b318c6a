//! Catalog service: categories and brands.

use makaan_common::{AppError, AppResult, IdGenerator};
use makaan_db::{
    entities::{brand, category},
    repositories::{BrandRepository, CategoryRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a category.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(url)]
    pub image_url: Option<String>,
}

/// Input for creating a brand.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrandInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(url)]
    pub logo_url: Option<String>,
}

/// Catalog service for business logic.
#[derive(Clone)]
pub struct CatalogService {
    category_repo: CategoryRepository,
    brand_repo: BrandRepository,
    id_gen: IdGenerator,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(category_repo: CategoryRepository, brand_repo: BrandRepository) -> Self {
        Self {
            category_repo,
            brand_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All categories.
    pub async fn categories(&self) -> AppResult<Vec<category::Model>> {
        self.category_repo.find_all().await
    }

    /// All brands.
    pub async fn brands(&self) -> AppResult<Vec<brand::Model>> {
        self.brand_repo.find_all().await
    }

    /// Create a category; names are unique.
    pub async fn create_category(&self, input: CreateCategoryInput) -> AppResult<category::Model> {
        input.validate()?;

        let name = input.name.trim().to_string();
        if self.category_repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Category already exists: {name}"
            )));
        }

        let model = category::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            image_url: Set(input.image_url),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.category_repo.create(model).await
    }

    /// Create a brand; names are unique.
    pub async fn create_brand(&self, input: CreateBrandInput) -> AppResult<brand::Model> {
        input.validate()?;

        let name = input.name.trim().to_string();
        if self.brand_repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(format!("Brand already exists: {name}")));
        }

        let model = brand::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            logo_url: Set(input.logo_url),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.brand_repo.create(model).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_input_requires_name() {
        let input = CreateCategoryInput {
            name: String::new(),
            image_url: None,
        };
        assert!(input.validate().is_err());
    }
}
