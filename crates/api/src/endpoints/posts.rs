//! Post endpoints.

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::AppResult;
use makaan_core::{CreatePostInput, FlagInput, FlagState, FlagTargetType};
use makaan_db::entities::post::Model as PostModel;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Paged},
};

use super::PageQuery;

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub created_at: String,
    pub caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_by: String,
    pub flag_count: i32,
    pub is_violated: bool,
}

impl From<PostModel> for PostResponse {
    fn from(p: PostModel) -> Self {
        Self {
            id: p.id,
            created_at: p.created_at.to_rfc3339(),
            caption: p.caption,
            image_url: p.image_url,
            created_by: p.created_by,
            flag_count: p.flag_count,
            is_violated: p.is_violated,
        }
    }
}

/// Create a post.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&user.id, req).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Request bodies carrying a post id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostIdRequest {
    pub post_id: String,
}

/// Get a post.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&req.post_id).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Delete a post.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PostIdRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.post_service.delete(&user.id, &req.post_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}

/// Public feed.
async fn feed(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageQuery>,
) -> AppResult<Paged<PostResponse>> {
    let page = state
        .post_service
        .feed(viewer.as_ref().map(|u| u.id.as_str()), req.window())
        .await?;
    Ok(Paged(page.map(Into::into)))
}

/// The caller's own posts.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageQuery>,
) -> AppResult<Paged<PostResponse>> {
    let page = state.post_service.mine(&user.id, req.window()).await?;
    Ok(Paged(page.map(Into::into)))
}

/// Flag post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagPostRequest {
    pub post_id: String,
    pub reason: String,
}

/// Flag a post.
async fn flag(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FlagPostRequest>,
) -> AppResult<ApiResponse<FlagState>> {
    let state_after = state
        .moderation_service
        .flag(
            &actor.id,
            FlagInput {
                target_type: FlagTargetType::Post,
                target_id: req.post_id,
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
        .route("/delete", post(delete))
        .route("/feed", post(feed))
        .route("/mine", post(mine))
        .route("/flag", post(flag))
}
