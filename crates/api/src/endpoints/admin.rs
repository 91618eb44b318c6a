//! Administrative moderation endpoints.

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::{AppError, AppResult};
use makaan_core::{FlagState, FlagTargetType};
use makaan_db::entities::flag;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AdminUser,
    middleware::AppState,
    response::ApiResponse,
};

use super::PageQuery;
use super::posts::PostResponse;
use super::projects::ProjectResponse;
use super::users::UserResponse;

fn parse_target_type(name: &str) -> AppResult<FlagTargetType> {
    match name {
        "user" => Ok(FlagTargetType::User),
        "project" => Ok(FlagTargetType::Project),
        "post" => Ok(FlagTargetType::Post),
        "product" => Ok(FlagTargetType::Product),
        other => Err(AppError::BadRequest(format!(
            "Unknown flag target type: {other}"
        ))),
    }
}

/// Flag target reference.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagTargetRequest {
    pub target_type: String,
    pub target_id: String,
}

/// One flag record on an entity.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub id: String,
    pub flagged_by: String,
    pub reason: String,
    pub created_at: String,
}

impl From<flag::Model> for FlagResponse {
    fn from(f: flag::Model) -> Self {
        Self {
            id: f.id,
            flagged_by: f.flagged_by,
            reason: f.reason,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// Clear every flag on an entity.
async fn clear_flags(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<FlagTargetRequest>,
) -> AppResult<ApiResponse<FlagState>> {
    let target_type = parse_target_type(&req.target_type)?;
    let cleared = state
        .moderation_service
        .clear_flags(target_type, &req.target_id)
        .await?;
    Ok(ApiResponse::ok(cleared))
}

/// List the flags raised against one entity.
async fn list_flags(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<FlagTargetRequest>,
) -> AppResult<ApiResponse<Vec<FlagResponse>>> {
    let target_type = parse_target_type(&req.target_type)?;
    let flags = state
        .moderation_service
        .flags_for(target_type, &req.target_id)
        .await?;
    Ok(ApiResponse::ok(flags.into_iter().map(Into::into).collect()))
}

/// Posts awaiting moderation.
async fn flagged_posts(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<PageQuery>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let window = req.window();
    let rows = state
        .moderation_service
        .flagged_posts(window.skip(), window.limit)
        .await?;
    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

/// Projects awaiting moderation.
async fn flagged_projects(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<PageQuery>,
) -> AppResult<ApiResponse<Vec<ProjectResponse>>> {
    let window = req.window();
    let rows = state
        .moderation_service
        .flagged_projects(window.skip(), window.limit)
        .await?;
    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

/// Users awaiting moderation.
async fn flagged_users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(req): Json<PageQuery>,
) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let window = req.window();
    let rows = state
        .moderation_service
        .flagged_users(window.skip(), window.limit)
        .await?;
    Ok(ApiResponse::ok(rows.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/flags/clear", post(clear_flags))
        .route("/flags/list", post(list_flags))
        .route("/flagged/posts", post(flagged_posts))
        .route("/flagged/projects", post(flagged_projects))
        .route("/flagged/users", post(flagged_users))
}
