//! Search endpoints.

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::{AppError, AppResult, Paginated};
use makaan_core::SearchResults;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::ApiResponse,
};

use super::PageQuery;
use super::catalog::CategoryResponse;
use super::products::{BrandResponse, ProductResponse};
use super::projects::ProjectWithOwnerResponse;
use super::users::UserWithListingsResponse;

/// Search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Search query text.
    pub q: String,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// The assembled multi-section search response. Every section carries its
/// own pagination metadata.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub categories: Paginated<CategoryResponse>,
    pub brands: Paginated<BrandResponse>,
    pub products: Paginated<ProductResponse>,
    pub projects: Paginated<ProjectWithOwnerResponse>,
    pub users: Paginated<UserWithListingsResponse>,
    pub product_sellers: Paginated<UserWithListingsResponse>,
}

impl From<SearchResults> for SearchResponse {
    fn from(r: SearchResults) -> Self {
        Self {
            categories: r.categories.map(Into::into),
            brands: r.brands.map(Into::into),
            products: r.products.map(Into::into),
            projects: r.projects.map(Into::into),
            users: r.users.map(Into::into),
            product_sellers: r.product_sellers.map(Into::into),
        }
    }
}

/// Fuzzy-search every section.
async fn all(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> AppResult<ApiResponse<SearchResponse>> {
    let query = req.q.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "Search query is required".to_string(),
        ));
    }

    let results = state
        .search_service
        .search_all(
            query,
            viewer.as_ref().map(|u| u.id.as_str()),
            req.page.window(),
        )
        .await?;

    Ok(ApiResponse::ok(results.into()))
}

/// Fuzzy-search product sellers only.
async fn product_sellers(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> AppResult<ApiResponse<Paginated<UserWithListingsResponse>>> {
    let query = req.q.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "Search query is required".to_string(),
        ));
    }

    let page = state
        .search_service
        .search_product_sellers(
            query,
            viewer.as_ref().map(|u| u.id.as_str()),
            req.page.window(),
        )
        .await?;

    Ok(ApiResponse::ok(page.map(Into::into)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/all", post(all))
        .route("/product-sellers", post(product_sellers))
}
