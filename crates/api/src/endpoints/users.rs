//! Users endpoints.

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::{AppError, AppResult};
use makaan_core::{FlagInput, FlagState, FlagTargetType, UpdateProfileInput, UserWithListings};
use makaan_db::entities::user::{self, UserRole};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, Paged},
};

use super::PageQuery;
use super::products::ProductResponse;
use super::projects::ProjectResponse;

/// Company details on a user profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetailsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_gst_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_place: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<i32>,
}

/// User response. Credentials and OTP state never leave the server.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub created_at: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    pub company_details: CompanyDetailsResponse,
    pub flag_count: i32,
    pub is_violated: bool,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            created_at: u.created_at.to_rfc3339(),
            phone_number: u.phone_number,
            fname: u.fname,
            lname: u.lname,
            email: u.email,
            role: role_name(u.role).to_string(),
            profile_image: u.profile_image,
            place: u.place,
            company_details: CompanyDetailsResponse {
                company_name: u.company_name,
                company_email: u.company_email,
                company_phone: u.company_phone,
                company_gst_number: u.company_gst_number,
                company_place: u.company_place,
                bio: u.company_bio,
                experience: u.experience_years,
            },
            flag_count: u.flag_count,
            is_violated: u.is_violated,
        }
    }
}

/// A user with their portfolio attached.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithListingsResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub projects: Vec<ProjectResponse>,
    pub products: Vec<ProductResponse>,
}

impl From<UserWithListings> for UserWithListingsResponse {
    fn from(hit: UserWithListings) -> Self {
        Self {
            user: hit.user.into(),
            projects: hit.projects.into_iter().map(Into::into).collect(),
            products: hit.products.into_iter().map(Into::into).collect(),
        }
    }
}

pub(crate) fn role_name(role: UserRole) -> &'static str {
    match role {
        UserRole::HomeOwner => "home_owner",
        UserRole::Realtor => "realtor",
        UserRole::Professional => "professional",
        UserRole::ProductSeller => "product_seller",
        UserRole::Admin => "admin",
    }
}

pub(crate) fn parse_role(name: &str) -> Option<UserRole> {
    match name {
        "home_owner" => Some(UserRole::HomeOwner),
        "realtor" => Some(UserRole::Realtor),
        "professional" => Some(UserRole::Professional),
        "product_seller" => Some(UserRole::ProductSeller),
        "admin" => Some(UserRole::Admin),
        _ => None,
    }
}

/// Get current user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

/// Show user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowUserRequest {
    pub user_id: String,
}

/// Get a user by ID.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&req.user_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Update user request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub profile_image: Option<String>,
    pub place: Option<String>,
    pub company_details: Option<UpdateCompanyDetailsRequest>,
}

/// Company details update payload.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyDetailsRequest {
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
    pub company_gst_number: Option<String>,
    pub company_place: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<i32>,
}

impl UpdateUserRequest {
    fn into_input(self) -> AppResult<UpdateProfileInput> {
        let role = match self.role {
            Some(ref name) => Some(
                parse_role(name)
                    .ok_or_else(|| AppError::BadRequest(format!("Unknown role: {name}")))?,
            ),
            None => None,
        };

        let company = self.company_details.unwrap_or_default();

        Ok(UpdateProfileInput {
            fname: self.fname,
            lname: self.lname,
            email: self.email,
            role,
            profile_image: self.profile_image,
            place: self.place,
            company_name: company.company_name,
            company_email: company.company_email,
            company_phone: company.company_phone,
            company_gst_number: company.company_gst_number,
            company_place: company.company_place,
            company_bio: company.bio,
            experience_years: company.experience,
        })
    }
}

/// Update current user.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.update(&user.id, req.into_input()?).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Directory request: users by role, portfolios attached.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRequest {
    /// Role names; empty means every public role.
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// List users by role with their projects or products attached.
async fn directory(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<DirectoryRequest>,
) -> AppResult<Paged<UserWithListingsResponse>> {
    let mut roles = Vec::with_capacity(req.roles.len());
    for name in &req.roles {
        let role =
            parse_role(name).ok_or_else(|| AppError::BadRequest(format!("Unknown role: {name}")))?;
        if role == UserRole::Admin {
            return Err(AppError::BadRequest(
                "Admin accounts are not listable".to_string(),
            ));
        }
        roles.push(role);
    }

    let page = state
        .user_service
        .directory(
            &roles,
            viewer.as_ref().map(|u| u.id.as_str()),
            req.page.window(),
        )
        .await?;

    Ok(Paged(page.map(Into::into)))
}

/// Flag user request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagUserRequest {
    pub user_id: String,
    pub reason: String,
}

/// Flag a user.
async fn flag(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FlagUserRequest>,
) -> AppResult<ApiResponse<FlagState>> {
    let state_after = state
        .moderation_service
        .flag(
            &actor.id,
            FlagInput {
                target_type: FlagTargetType::User,
                target_id: req.user_id,
                reason: req.reason,
            },
        )
        .await?;

    Ok(ApiResponse::ok(state_after))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", post(me))
        .route("/show", post(show))
        .route("/update", post(update))
        .route("/directory", post(directory))
        .route("/flag", post(flag))
}
