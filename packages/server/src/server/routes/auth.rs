//! `/api/v1/auth/*` handlers

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::domains::auth::activities::{self, RegisterProfile};
use crate::domains::auth::{OtpSent, TokenBundle};
use crate::domains::users::models::User;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::extract::ApiJson;
use crate::server::middleware::AuthUser;
use crate::server::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/send-otp", post(send_otp_handler))
        .route("/verify-otp", post(verify_otp_handler))
        .route("/login", post(verify_otp_handler))
        .route("/register", post(register_handler))
        .route("/refresh", post(refresh_handler))
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
}

pub async fn send_otp_handler(
    Extension(state): Extension<AxumAppState>,
    ApiJson(body): ApiJson<SendOtpRequest>,
) -> Result<ApiResponse<OtpSent>, ApiError> {
    let sent = activities::send_otp(&body.phone_number, &state.deps).await?;
    let message = if sent.dispatched {
        "OTP sent successfully"
    } else {
        "OTP generated but SMS delivery failed"
    };
    Ok(ApiResponse::ok(message, sent))
}

pub async fn verify_otp_handler(
    Extension(state): Extension<AxumAppState>,
    ApiJson(body): ApiJson<VerifyOtpRequest>,
) -> Result<ApiResponse<TokenBundle>, ApiError> {
    let tokens = activities::verify_otp(&body.phone_number, &body.otp, &state.deps).await?;
    Ok(ApiResponse::ok("OTP verified successfully", tokens))
}

pub async fn register_handler(
    Extension(state): Extension<AxumAppState>,
    ApiJson(profile): ApiJson<RegisterProfile>,
) -> Result<ApiResponse<TokenBundle>, ApiError> {
    let tokens = activities::register(profile, &state.deps).await?;
    Ok(ApiResponse::ok("Registration successful", tokens))
}

pub async fn refresh_handler(
    Extension(state): Extension<AxumAppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<ApiResponse<TokenBundle>, ApiError> {
    let tokens = activities::refresh(&body.refresh_token, &state.deps).await?;
    Ok(ApiResponse::ok("Token refreshed successfully", tokens))
}

pub async fn logout_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<LogoutRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    activities::logout(
        user.user_id,
        &user.access_token,
        &body.refresh_token,
        &state.deps,
    )
    .await?;
    Ok(ApiResponse::message("Logout successful"))
}

pub async fn me_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
) -> Result<ApiResponse<User>, ApiError> {
    let user = activities::current_user(user.user_id, &state.deps).await?;
    Ok(ApiResponse::ok("User retrieved successfully", user))
}
