//! Product service.

use makaan_common::{AppError, AppResult, IdGenerator, PageWindow, Paginated};
use makaan_db::{
    entities::{brand, product, user},
    repositories::{BrandRepository, ProductRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

use super::search::ProductWithBrand;
use super::visibility::VisibilityService;

/// Input for creating a product.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(length(max = 4096))]
    pub about: Option<String>,

    #[validate(length(max = 128))]
    pub category: Option<String>,

    #[validate(length(max = 128))]
    pub subcategory: Option<String>,

    #[validate(length(max = 128))]
    pub product_type: Option<String>,

    #[validate(length(max = 128))]
    pub subtype: Option<String>,

    #[validate(range(min = 0))]
    pub price: i64,

    #[validate(range(min = 0))]
    pub discount_price: Option<i64>,

    pub brand_id: Option<String>,
}

/// Product service for business logic.
#[derive(Clone)]
pub struct ProductService {
    product_repo: ProductRepository,
    brand_repo: BrandRepository,
    visibility: VisibilityService,
    id_gen: IdGenerator,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub const fn new(
        product_repo: ProductRepository,
        brand_repo: BrandRepository,
        visibility: VisibilityService,
    ) -> Self {
        Self {
            product_repo,
            brand_repo,
            visibility,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a product owned by `owner`.
    pub async fn create(
        &self,
        owner: &user::Model,
        input: CreateProductInput,
    ) -> AppResult<product::Model> {
        input.validate()?;

        if !owner.role.has_products() {
            return Err(AppError::Forbidden(
                "Only product sellers can publish products".to_string(),
            ));
        }

        if let Some(discount) = input.discount_price
            && discount > input.price
        {
            return Err(AppError::BadRequest(
                "Discount cannot exceed the price".to_string(),
            ));
        }

        // Brand reference must resolve when given.
        if let Some(ref brand_id) = input.brand_id
            && self.brand_repo.find_by_id(brand_id).await?.is_none()
        {
            return Err(AppError::NotFound(format!("Brand not found: {brand_id}")));
        }

        let model = product::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            about: Set(input.about),
            category: Set(input.category),
            subcategory: Set(input.subcategory),
            product_type: Set(input.product_type),
            subtype: Set(input.subtype),
            price: Set(input.price),
            discount_price: Set(input.discount_price),
            brand_id: Set(input.brand_id),
            created_by: Set(owner.id.clone()),
            flag_count: Set(0),
            is_violated: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.product_repo.create(model).await
    }

    /// Get a product with its brand populated.
    pub async fn get(&self, id: &str) -> AppResult<ProductWithBrand> {
        let product = self.product_repo.get_by_id(id).await?;
        let brand = match product.brand_id {
            Some(ref brand_id) => self.brand_repo.find_by_id(brand_id).await?,
            None => None,
        };
        Ok(ProductWithBrand { product, brand })
    }

    /// Catalog listing with brand population and visibility exclusions.
    pub async fn list(
        &self,
        category: Option<&str>,
        viewer_id: Option<&str>,
        window: PageWindow,
    ) -> AppResult<Paginated<ProductWithBrand>> {
        let vis = self.visibility.compute(viewer_id).await;
        let excluded = &vis.excluded_owner_ids;

        let (products, total) = tokio::try_join!(
            self.product_repo
                .list(category, excluded, window.skip(), window.limit),
            self.product_repo.count(category, excluded),
        )?;

        let brand_ids: Vec<String> = {
            let mut seen = std::collections::HashSet::new();
            products
                .iter()
                .filter_map(|p| p.brand_id.clone())
                .filter(|id| seen.insert(id.clone()))
                .collect()
        };
        let brands: HashMap<String, brand::Model> = self
            .brand_repo
            .find_by_ids(&brand_ids)
            .await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        let populated = products
            .into_iter()
            .map(|product| {
                let brand = product
                    .brand_id
                    .as_ref()
                    .and_then(|id| brands.get(id))
                    .cloned();
                ProductWithBrand { product, brand }
            })
            .collect();

        Ok(Paginated::assemble(populated, window, total))
    }

    /// A seller's own products, paginated.
    pub async fn mine(
        &self,
        owner_id: &str,
        window: PageWindow,
    ) -> AppResult<Paginated<product::Model>> {
        let owner_ids = [owner_id.to_string()];
        let (products, total) = tokio::try_join!(
            self.product_repo
                .find_by_owners(&owner_ids, window.skip(), window.limit),
            self.product_repo.count_by_owner(owner_id),
        )?;

        Ok(Paginated::assemble(products, window, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_rejects_negative_price() {
        let input = CreateProductInput {
            name: "Teak door".to_string(),
            about: None,
            category: None,
            subcategory: None,
            product_type: None,
            subtype: None,
            price: -10,
            discount_price: None,
            brand_id: None,
        };
        assert!(input.validate().is_err());
    }
}
