//! Product endpoints.

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::AppResult;
use makaan_core::{
    CreateProductInput, FlagInput, FlagState, FlagTargetType, ProductWithBrand,
};
use makaan_db::entities::{brand, product};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Paged},
};

use super::PageQuery;

/// Brand reference on a product.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl From<brand::Model> for BrandResponse {
    fn from(b: brand::Model) -> Self {
        Self {
            id: b.id,
            name: b.name,
            logo_url: b.logo_url,
        }
    }
}

/// Product response; `last_price` is the effective price after discount.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub created_at: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<i64>,
    pub last_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<BrandResponse>,
    pub created_by: String,
    pub flag_count: i32,
    pub is_violated: bool,
}

impl From<product::Model> for ProductResponse {
    fn from(p: product::Model) -> Self {
        let last_price = p.last_price();
        Self {
            id: p.id,
            created_at: p.created_at.to_rfc3339(),
            name: p.name,
            about: p.about,
            category: p.category,
            subcategory: p.subcategory,
            product_type: p.product_type,
            subtype: p.subtype,
            price: p.price,
            discount_price: p.discount_price,
            last_price,
            brand: None,
            created_by: p.created_by,
            flag_count: p.flag_count,
            is_violated: p.is_violated,
        }
    }
}

impl From<ProductWithBrand> for ProductResponse {
    fn from(hit: ProductWithBrand) -> Self {
        let mut response: Self = hit.product.into();
        response.brand = hit.brand.map(Into::into);
        response
    }
}

/// Create a product.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateProductInput>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let product = state.product_service.create(&user, req).await?;
    Ok(ApiResponse::ok(product.into()))
}

/// Request bodies carrying a product id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdRequest {
    pub product_id: String,
}

/// Get a product with its brand.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ProductIdRequest>,
) -> AppResult<ApiResponse<ProductResponse>> {
    let hit = state.product_service.get(&req.product_id).await?;
    Ok(ApiResponse::ok(hit.into()))
}

/// Listing request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsRequest {
    pub category: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Catalog listing.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListProductsRequest>,
) -> AppResult<Paged<ProductResponse>> {
    let page = state
        .product_service
        .list(
            req.category.as_deref(),
            viewer.as_ref().map(|u| u.id.as_str()),
            req.page.window(),
        )
        .await?;
    Ok(Paged(page.map(Into::into)))
}

/// The caller's own products.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageQuery>,
) -> AppResult<Paged<ProductResponse>> {
    let page = state.product_service.mine(&user.id, req.window()).await?;
    Ok(Paged(page.map(Into::into)))
}

/// Flag product request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagProductRequest {
    pub product_id: String,
    pub reason: String,
}

/// Flag a product.
async fn flag(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FlagProductRequest>,
) -> AppResult<ApiResponse<FlagState>> {
    let state_after = state
        .moderation_service
        .flag(
            &actor.id,
            FlagInput {
                target_type: FlagTargetType::Product,
                target_id: req.product_id,
                reason: req.reason,
            },
        )
        .await?;

    Ok(ApiResponse::ok(state_after))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/mine", post(mine))
        .route("/flag", post(flag))
}
