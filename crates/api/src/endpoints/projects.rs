//! Project endpoints.

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::AppResult;
use makaan_core::{
    CreateProjectInput, FlagInput, FlagState, FlagTargetType, ProjectListQuery, ProjectWithOwner,
    UpdateProjectInput,
};
use makaan_db::entities::project;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Paged},
};

use super::PageQuery;
use super::users::UserResponse;

/// Project response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub created_at: String,
    pub title: String,
    pub project_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub construction_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    pub created_by: String,
    pub flag_count: i32,
    pub is_violated: bool,
}

impl From<project::Model> for ProjectResponse {
    fn from(p: project::Model) -> Self {
        Self {
            id: p.id,
            created_at: p.created_at.to_rfc3339(),
            title: p.title,
            project_type: p.project_type,
            construction_type: p.construction_type,
            style: p.style,
            place: p.place,
            area_sqft: p.area_sqft,
            cost: p.cost,
            about: p.about,
            created_by: p.created_by,
            flag_count: p.flag_count,
            is_violated: p.is_violated,
        }
    }
}

/// Project response with the owner populated.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithOwnerResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserResponse>,
}

impl From<ProjectWithOwner> for ProjectWithOwnerResponse {
    fn from(hit: ProjectWithOwner) -> Self {
        Self {
            project: hit.project.into(),
            owner: hit.owner.map(Into::into),
        }
    }
}

/// Create a project.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateProjectInput>,
) -> AppResult<ApiResponse<ProjectResponse>> {
    let project = state.project_service.create(&user, req).await?;
    Ok(ApiResponse::ok(project.into()))
}

/// Update project request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub project_id: String,
    #[serde(flatten)]
    pub changes: UpdateProjectInput,
}

/// Update a project.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProjectRequest>,
) -> AppResult<ApiResponse<ProjectResponse>> {
    let project = state
        .project_service
        .update(&user.id, &req.project_id, req.changes)
        .await?;
    Ok(ApiResponse::ok(project.into()))
}

/// Show/delete/flag request bodies carry the project id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectIdRequest {
    pub project_id: String,
}

/// Get a project with its owner.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ProjectIdRequest>,
) -> AppResult<ApiResponse<ProjectWithOwnerResponse>> {
    let hit = state.project_service.get(&req.project_id).await?;
    Ok(ApiResponse::ok(hit.into()))
}

/// Delete a project.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProjectIdRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .project_service
        .delete(&user.id, &req.project_id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "deleted": true })))
}

/// Listing request: typed filters plus pagination.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsRequest {
    #[serde(flatten)]
    pub filters: ProjectListQuery,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Public project listing.
async fn list(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListProjectsRequest>,
) -> AppResult<Paged<ProjectWithOwnerResponse>> {
    let page = state
        .project_service
        .list(
            &req.filters,
            viewer.as_ref().map(|u| u.id.as_str()),
            req.page.window(),
        )
        .await?;
    Ok(Paged(page.map(Into::into)))
}

/// The caller's own projects.
async fn mine(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PageQuery>,
) -> AppResult<Paged<ProjectResponse>> {
    let page = state.project_service.mine(&user.id, req.window()).await?;
    Ok(Paged(page.map(Into::into)))
}

/// Flag project request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagProjectRequest {
    pub project_id: String,
    pub reason: String,
}

/// Flag a project.
async fn flag(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FlagProjectRequest>,
) -> AppResult<ApiResponse<FlagState>> {
    let state_after = state
        .moderation_service
        .flag(
            &actor.id,
            FlagInput {
                target_type: FlagTargetType::Project,
                target_id: req.project_id,
                reason: req.reason,
            },
        )
        .await?;

    Ok(ApiResponse::ok(state_after))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/show", post(show))
        .route("/delete", post(delete))
        .route("/list", post(list))
        .route("/mine", post(mine))
        .route("/flag", post(flag))
}
