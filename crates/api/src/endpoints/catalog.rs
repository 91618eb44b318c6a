//! Catalog endpoints (categories and brands).

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::AppResult;
use makaan_core::{CreateBrandInput, CreateCategoryInput};
use makaan_db::entities::category;
use serde::Serialize;

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::ApiResponse,
};

use super::products::BrandResponse;

/// Category response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<category::Model> for CategoryResponse {
    fn from(c: category::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            image_url: c.image_url,
        }
    }
}

/// List categories.
async fn categories(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let rows = state.catalog_service.categories().await?;
    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

/// List brands.
async fn brands(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<BrandResponse>>> {
    let rows = state.catalog_service.brands().await?;
    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

/// Create a category (admin only).
async fn create_category(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryInput>,
) -> AppResult<ApiResponse<CategoryResponse>> {
    let row = state.catalog_service.create_category(req).await?;
    Ok(ApiResponse::ok(row.into()))
}

/// Create a brand (admin only).
async fn create_brand(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBrandInput>,
) -> AppResult<ApiResponse<BrandResponse>> {
    let row = state.catalog_service.create_brand(req).await?;
    Ok(ApiResponse::ok(row.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", post(categories))
        .route("/categories/create", post(create_category))
        .route("/brands", post(brands))
        .route("/brands/create", post(create_brand))
}
