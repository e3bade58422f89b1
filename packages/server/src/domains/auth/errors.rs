use thiserror::Error;

use crate::common::ErrorCode;
use crate::domains::users::UserError;

/// Authentication and session errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid phone number format")]
    MalformedPhone,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("OTP expired or not found")]
    CodeExpiredOrUnknown,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("Authentication required")]
    Unauthorized,

    #[error("User already exists")]
    DuplicateUser,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateUser => AuthError::DuplicateUser,
            UserError::NotFound => AuthError::UserNotFound,
            UserError::Database(e) => AuthError::Database(e),
        }
    }
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::MalformedPhone => ErrorCode::MalformedPhone,
            AuthError::InvalidOtp => ErrorCode::InvalidOtp,
            AuthError::CodeExpiredOrUnknown => ErrorCode::CodeExpiredOrUnknown,
            AuthError::InvalidOrExpiredToken => ErrorCode::InvalidOrExpiredToken,
            AuthError::Unauthorized => ErrorCode::Unauthorized,
            AuthError::DuplicateUser => ErrorCode::DuplicateUser,
            AuthError::UserNotFound => ErrorCode::UserNotFound,
            AuthError::Validation(_) => ErrorCode::ValidationFailed,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorCode::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_keep_their_code() {
        assert_eq!(
            AuthError::from(UserError::DuplicateUser).code(),
            ErrorCode::DuplicateUser
        );
        assert_eq!(
            AuthError::from(UserError::NotFound).code(),
            ErrorCode::UserNotFound
        );
    }

    #[test]
    fn test_infrastructure_is_internal() {
        let err = AuthError::Internal(anyhow::anyhow!("signing failed"));
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
