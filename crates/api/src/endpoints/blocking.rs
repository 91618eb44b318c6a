//! Blocking endpoints.

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::AppResult;
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Paged},
};

use super::PageQuery;
use super::users::UserResponse;

/// Block/unblock request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRequest {
    pub user_id: String,
}

/// Block list request.
#[derive(Debug, Deserialize)]
pub struct BlockListRequest {
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Block a user.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BlockRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.blocking_service.block(&user.id, &req.user_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "blocked": true })))
}

/// Unblock a user.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BlockRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .blocking_service
        .unblock(&user.id, &req.user_id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "blocked": false })))
}

/// List blocked users.
async fn list(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<BlockListRequest>,
) -> AppResult<Paged<UserResponse>> {
    let page = state
        .blocking_service
        .list(&user.id, req.page.window())
        .await?;
    Ok(Paged(page.map(Into::into)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/delete", post(delete))
        .route("/list", post(list))
}
