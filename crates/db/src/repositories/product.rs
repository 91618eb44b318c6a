//! Product repository.

use std::sync::Arc;

use crate::entities::{Product, product};
use crate::repositories::matching::any_column_matches;
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Columns consulted by the general fuzzy product search.
const SEARCH_COLUMNS: [product::Column; 5] = [
    product::Column::Name,
    product::Column::Category,
    product::Column::Subcategory,
    product::Column::ProductType,
    product::Column::Subtype,
];

/// Columns consulted when matching a seller's own products.
const OWNER_SEARCH_COLUMNS: [product::Column; 2] =
    [product::Column::Name, product::Column::About];

/// Product repository for database operations.
#[derive(Clone)]
pub struct ProductRepository {
    db: Arc<DatabaseConnection>,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a product by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<product::Model>> {
        Product::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a product by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<product::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(id.to_string()))
    }

    /// Create a new product.
    pub async fn create(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a product.
    pub async fn update(&self, model: product::ActiveModel) -> AppResult<product::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn listing_condition(category: Option<&str>, excluded_owner_ids: &[String]) -> Condition {
        let mut cond = Condition::all().add(product::Column::IsViolated.eq(false));
        if let Some(c) = category {
            cond = cond.add(product::Column::Category.eq(c));
        }
        if !excluded_owner_ids.is_empty() {
            cond = cond.add(product::Column::CreatedBy.is_not_in(excluded_owner_ids.to_vec()));
        }
        cond
    }

    /// Catalog listing, optionally narrowed to one category.
    pub async fn list(
        &self,
        category: Option<&str>,
        excluded_owner_ids: &[String],
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<product::Model>> {
        Product::find()
            .filter(Self::listing_condition(category, excluded_owner_ids))
            .order_by_desc(product::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count products matching [`Self::list`].
    pub async fn count(
        &self,
        category: Option<&str>,
        excluded_owner_ids: &[String],
    ) -> AppResult<u64> {
        Product::find()
            .filter(Self::listing_condition(category, excluded_owner_ids))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn search_condition(pattern: &str, excluded_owner_ids: &[String]) -> Condition {
        let mut cond = Condition::all()
            .add(product::Column::IsViolated.eq(false))
            .add(any_column_matches(&SEARCH_COLUMNS, pattern));
        if !excluded_owner_ids.is_empty() {
            cond = cond.add(product::Column::CreatedBy.is_not_in(excluded_owner_ids.to_vec()));
        }
        cond
    }

    /// Fuzzy-search products across name and taxonomy columns.
    pub async fn search(
        &self,
        pattern: &str,
        excluded_owner_ids: &[String],
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<product::Model>> {
        Product::find()
            .filter(Self::search_condition(pattern, excluded_owner_ids))
            .order_by_desc(product::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count products matching [`Self::search`].
    pub async fn count_search(
        &self,
        pattern: &str,
        excluded_owner_ids: &[String],
    ) -> AppResult<u64> {
        Product::find()
            .filter(Self::search_condition(pattern, excluded_owner_ids))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn owner_search_condition(owner_ids: &[String], pattern: &str) -> Condition {
        Condition::all()
            .add(product::Column::CreatedBy.is_in(owner_ids.to_vec()))
            .add(product::Column::IsViolated.eq(false))
            .add(any_column_matches(&OWNER_SEARCH_COLUMNS, pattern))
    }

    /// Matching products owned by any of `owner_ids` (join phase of the
    /// search aggregator).
    pub async fn search_by_owners(
        &self,
        owner_ids: &[String],
        pattern: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<product::Model>> {
        if owner_ids.is_empty() {
            return Ok(vec![]);
        }

        Product::find()
            .filter(Self::owner_search_condition(owner_ids, pattern))
            .order_by_desc(product::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Non-violated products owned by any of `owner_ids` (user directory).
    pub async fn find_by_owners(
        &self,
        owner_ids: &[String],
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<product::Model>> {
        if owner_ids.is_empty() {
            return Ok(vec![]);
        }

        Product::find()
            .filter(product::Column::CreatedBy.is_in(owner_ids.to_vec()))
            .filter(product::Column::IsViolated.eq(false))
            .order_by_desc(product::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a seller's non-violated products.
    pub async fn count_by_owner(&self, owner_id: &str) -> AppResult<u64> {
        Product::find()
            .filter(product::Column::CreatedBy.eq(owner_id))
            .filter(product::Column::IsViolated.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Append one flag's worth of counters atomically (single UPDATE, no
    /// fetch).
    pub async fn register_flag(&self, product_id: &str, threshold: i32) -> AppResult<()> {
        Product::update_many()
            .col_expr(
                product::Column::FlagCount,
                Expr::col(product::Column::FlagCount).add(1),
            )
            .col_expr(
                product::Column::IsViolated,
                Expr::cust_with_values("is_violated OR flag_count + 1 >= ?", [threshold]),
            )
            .filter(product::Column::Id.eq(product_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Reset the moderation counters (single UPDATE, no fetch).
    pub async fn clear_flags(&self, product_id: &str) -> AppResult<()> {
        Product::update_many()
            .col_expr(product::Column::FlagCount, Expr::value(0))
            .col_expr(product::Column::IsViolated, Expr::value(false))
            .filter(product::Column::Id.eq(product_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<product::Model>::new()])
                .into_connection(),
        );

        let repo = ProductRepository::new(db);
        match repo.get_by_id("missing").await {
            Err(AppError::ProductNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected ProductNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_search_by_owners_short_circuits_on_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = ProductRepository::new(db);
        let result = repo.search_by_owners(&[], "w.*d", 0, 10).await.unwrap();
        assert!(result.is_empty());
    }
}
