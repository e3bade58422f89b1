use thiserror::Error;

use crate::common::ErrorCode;

/// Identity ledger errors
#[derive(Error, Debug)]
pub enum UserError {
    #[error("A user with this phone number already exists")]
    DuplicateUser,

    #[error("User not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UserError {
    pub fn code(&self) -> ErrorCode {
        match self {
            UserError::DuplicateUser => ErrorCode::DuplicateUser,
            UserError::NotFound => ErrorCode::UserNotFound,
            UserError::Database(_) => ErrorCode::InternalError,
        }
    }
}
