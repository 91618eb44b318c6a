//! Order repository.

use std::sync::Arc;

use crate::entities::{Order, order};
use makaan_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Order repository for database operations.
#[derive(Clone)]
pub struct OrderRepository {
    db: Arc<DatabaseConnection>,
}

impl OrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an order by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<order::Model>> {
        Order::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an order by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<order::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::OrderNotFound(id.to_string()))
    }

    /// Create a new order.
    pub async fn create(&self, model: order::ActiveModel) -> AppResult<order::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an order.
    pub async fn update(&self, model: order::ActiveModel) -> AppResult<order::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A buyer's orders, newest first, paginated.
    pub async fn find_by_buyer(
        &self,
        user_id: &str,
        skip: u64,
        limit: u64,
    ) -> AppResult<Vec<order::Model>> {
        Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a buyer's orders.
    pub async fn count_by_buyer(&self, user_id: &str) -> AppResult<u64> {
        Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
