//! Order endpoints.

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::AppResult;
use makaan_core::{ConfirmPaymentInput, PlaceOrderInput};
use makaan_db::entities::order::{self, OrderStatus};
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Paged},
};

use super::PageQuery;

/// Order response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub created_at: String,
    pub product_id: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
}

fn status_name(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Paid => "paid",
        OrderStatus::Shipped => "shipped",
        OrderStatus::Delivered => "delivered",
        OrderStatus::Cancelled => "cancelled",
    }
}

impl From<order::Model> for OrderResponse {
    fn from(o: order::Model) -> Self {
        Self {
            id: o.id,
            created_at: o.created_at.to_rfc3339(),
            product_id: o.product_id,
            quantity: o.quantity,
            unit_price: o.unit_price,
            total_amount: o.total_amount,
            delivery_address: o.delivery_address,
            status: status_name(o.status).to_string(),
            payment_id: o.payment_id,
        }
    }
}

/// Place an order.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderInput>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.place(&user.id, req).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// Confirm a gateway payment.
async fn confirm_payment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ConfirmPaymentInput>,
) -> AppResult<ApiResponse<OrderResponse>> {
    let order = state.order_service.confirm_payment(&user.id, req).await?;
    Ok(ApiResponse::ok(order.into()))
}

/// The caller's order history.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageQuery>,
) -> AppResult<Paged<OrderResponse>> {
    let page = state.order_service.history(&user.id, req.window()).await?;
    Ok(Paged(page.map(Into::into)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/confirm-payment", post(confirm_payment))
        .route("/list", post(list))
}
