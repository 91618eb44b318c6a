//! Order service.

use std::sync::Arc;

use makaan_common::{AppError, AppResult, IdGenerator, PageWindow, Paginated};
use makaan_db::{
    entities::{order, order::OrderStatus},
    repositories::{OrderRepository, ProductRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::payment::PaymentVerifier;

/// Input for placing an order.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderInput {
    pub product_id: String,

    #[validate(range(min = 1, max = 1000))]
    pub quantity: i32,

    #[validate(length(min = 1, max = 1024))]
    pub delivery_address: Option<String>,
}

/// Input for confirming a gateway payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentInput {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Order service for business logic.
#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    product_repo: ProductRepository,
    payment: Arc<dyn PaymentVerifier>,
    id_gen: IdGenerator,
}

impl OrderService {
    /// Create a new order service.
    #[must_use]
    pub fn new(
        order_repo: OrderRepository,
        product_repo: ProductRepository,
        payment: Arc<dyn PaymentVerifier>,
    ) -> Self {
        Self {
            order_repo,
            product_repo,
            payment,
            id_gen: IdGenerator::new(),
        }
    }

    /// Place an order. Totals are computed server-side from the product's
    /// effective price; the client never supplies amounts.
    pub async fn place(&self, buyer_id: &str, input: PlaceOrderInput) -> AppResult<order::Model> {
        input.validate()?;

        let product = self.product_repo.get_by_id(&input.product_id).await?;
        if product.is_violated {
            return Err(AppError::BadRequest(
                "Product is not available".to_string(),
            ));
        }

        let unit_price = product.last_price();
        let total_amount = unit_price * i64::from(input.quantity);

        let model = order::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(buyer_id.to_string()),
            product_id: Set(product.id),
            quantity: Set(input.quantity),
            unit_price: Set(unit_price),
            total_amount: Set(total_amount),
            delivery_address: Set(input.delivery_address),
            status: Set(OrderStatus::Pending),
            payment_id: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.order_repo.create(model).await
    }

    /// Verify a gateway payment signature and mark the order paid.
    pub async fn confirm_payment(
        &self,
        buyer_id: &str,
        input: ConfirmPaymentInput,
    ) -> AppResult<order::Model> {
        let existing = self.order_repo.get_by_id(&input.order_id).await?;

        if existing.user_id != buyer_id {
            return Err(AppError::Forbidden(
                "Order belongs to another user".to_string(),
            ));
        }
        if existing.status != OrderStatus::Pending {
            return Err(AppError::BadRequest("Order is not pending".to_string()));
        }

        let authentic =
            self.payment
                .verify(&existing.id, &input.payment_id, &input.signature)?;
        if !authentic {
            return Err(AppError::BadRequest(
                "Invalid payment signature".to_string(),
            ));
        }

        let mut model: order::ActiveModel = existing.into();
        model.status = Set(OrderStatus::Paid);
        model.payment_id = Set(Some(input.payment_id));
        model.updated_at = Set(Some(chrono::Utc::now().into()));

        self.order_repo.update(model).await
    }

    /// The caller's order history, newest first.
    pub async fn history(
        &self,
        buyer_id: &str,
        window: PageWindow,
    ) -> AppResult<Paginated<order::Model>> {
        let (orders, total) = tokio::try_join!(
            self.order_repo
                .find_by_buyer(buyer_id, window.skip(), window.limit),
            self.order_repo.count_by_buyer(buyer_id),
        )?;

        Ok(Paginated::assemble(orders, window, total))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::payment::NoOpPaymentVerifier;
    use chrono::Utc;
    use makaan_db::entities::product;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn test_product(id: &str, price: i64, discount: Option<i64>) -> product::Model {
        product::Model {
            id: id.to_string(),
            name: "Cement bag".to_string(),
            about: None,
            category: None,
            subcategory: None,
            product_type: None,
            subtype: None,
            price,
            discount_price: discount,
            brand_id: None,
            created_by: "seller1".to_string(),
            flag_count: 0,
            is_violated: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_order(id: &str, product: &product::Model, quantity: i32) -> order::Model {
        let unit = product.last_price();
        order::Model {
            id: id.to_string(),
            user_id: "buyer1".to_string(),
            product_id: product.id.clone(),
            quantity,
            unit_price: unit,
            total_amount: unit * i64::from(quantity),
            delivery_address: None,
            status: OrderStatus::Pending,
            payment_id: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_place_computes_total_from_effective_price() {
        let product = test_product("prod1", 500, Some(50));
        let expected = test_order("order1", &product, 3);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[product]])
                .append_query_results([[expected.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = OrderService::new(
            OrderRepository::new(Arc::clone(&db)),
            ProductRepository::new(db),
            Arc::new(NoOpPaymentVerifier),
        );

        let order = service
            .place(
                "buyer1",
                PlaceOrderInput {
                    product_id: "prod1".to_string(),
                    quantity: 3,
                    delivery_address: None,
                },
            )
            .await
            .unwrap();

        // 3 * (500 - 50)
        assert_eq!(order.total_amount, 1350);
    }

    #[tokio::test]
    async fn test_place_rejects_zero_quantity() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = OrderService::new(
            OrderRepository::new(Arc::clone(&db)),
            ProductRepository::new(db),
            Arc::new(NoOpPaymentVerifier),
        );

        let result = service
            .place(
                "buyer1",
                PlaceOrderInput {
                    product_id: "prod1".to_string(),
                    quantity: 0,
                    delivery_address: None,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_confirm_payment_rejects_foreign_order() {
        let product = test_product("prod1", 100, None);
        let order = test_order("order1", &product, 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[order]])
                .into_connection(),
        );
        let service = OrderService::new(
            OrderRepository::new(Arc::clone(&db)),
            ProductRepository::new(db),
            Arc::new(NoOpPaymentVerifier),
        );

        let result = service
            .confirm_payment(
                "someone-else",
                ConfirmPaymentInput {
                    order_id: "order1".to_string(),
                    payment_id: "pay1".to_string(),
                    signature: "sig".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
