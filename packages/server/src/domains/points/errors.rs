use thiserror::Error;

use super::models::TransactionKind;
use crate::common::ErrorCode;

/// Points ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient points balance")]
    InsufficientBalance,

    #[error("Invalid amount {amount} for a {kind} transaction")]
    InvalidAmount { kind: TransactionKind, amount: i32 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::UserNotFound => ErrorCode::UserNotFound,
            LedgerError::InsufficientBalance => ErrorCode::InsufficientBalance,
            LedgerError::InvalidAmount { .. } => ErrorCode::ValidationFailed,
            LedgerError::Database(_) => ErrorCode::InternalError,
        }
    }
}
