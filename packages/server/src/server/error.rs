//! Transport-boundary error type. Domain errors are mapped to a status code
//! here and nowhere else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::common::{ErrorClass, ErrorCode};
use crate::domains::auth::AuthError;
use crate::domains::points::LedgerError;
use crate::domains::qr_codes::RedemptionError;
use crate::domains::users::UserError;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: ErrorCode,
    message: &'a str,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized, "Authentication required")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Log the detail, hide it from the caller
    fn internal(detail: &dyn std::fmt::Display) -> Self {
        error!(error = %detail, "Request failed with internal error");
        Self::new(ErrorCode::InternalError, INTERNAL_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        match self.code.class() {
            ErrorClass::Validation => StatusCode::BAD_REQUEST,
            ErrorClass::Authentication => StatusCode::UNAUTHORIZED,
            ErrorClass::NotFound => StatusCode::NOT_FOUND,
            ErrorClass::Conflict => StatusCode::CONFLICT,
            ErrorClass::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.code() {
            ErrorCode::InternalError => Self::internal(&err),
            code => Self::new(code, err.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err.code() {
            ErrorCode::InternalError => Self::internal(&err),
            code => Self::new(code, err.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err.code() {
            ErrorCode::InternalError => Self::internal(&err),
            code => Self::new(code, err.to_string()),
        }
    }
}

impl From<RedemptionError> for ApiError {
    fn from(err: RedemptionError) -> Self {
        match err.code() {
            ErrorCode::InternalError => Self::internal(&err),
            code => Self::new(code, err.to_string()),
        }
    }
}
