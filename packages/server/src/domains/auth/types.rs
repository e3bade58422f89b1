//! Auth domain data types
//!
//! Simple, serializable types returned by auth activities.

use serde::Serialize;

use crate::common::UserId;
use crate::domains::users::models::UserRole;

/// Result of sending an OTP
#[derive(Debug, Clone, Serialize)]
pub struct OtpSent {
    pub phone_number: String,
    /// Whether the SMS gateway accepted the message
    pub dispatched: bool,
    /// Only present when dispatch failed and the debug echo is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_code: Option<String>,
}

/// Access/refresh pair handed to the client after login, registration or refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user_id: UserId,
    pub role: UserRole,
}
