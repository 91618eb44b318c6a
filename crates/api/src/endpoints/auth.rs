//! Authentication endpoints (OTP login).

use axum::{Json, Router, extract::State, routing::post};
use makaan_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, ok},
};

use super::users::UserResponse;

/// Request an OTP.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpRequest {
    pub phone_number: String,
}

/// Verify an OTP.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub otp: String,
}

/// Successful login response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub profile_complete: bool,
    pub user: UserResponse,
}

/// Send an OTP to a phone number.
async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<RequestOtpRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.auth_service.request_otp(&req.phone_number).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "sent": true })))
}

/// Verify an OTP and issue a bearer token.
async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let outcome = state
        .auth_service
        .verify_otp(&req.phone_number, &req.otp)
        .await?;

    Ok(ApiResponse::ok(LoginResponse {
        token: outcome.token,
        profile_complete: outcome.profile_complete,
        user: outcome.user.into(),
    }))
}

/// Invalidate the caller's token.
async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl axum::response::IntoResponse> {
    state.auth_service.logout(user).await?;
    Ok(ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request-otp", post(request_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/logout", post(logout))
}
