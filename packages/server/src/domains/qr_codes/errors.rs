use thiserror::Error;

use crate::common::ErrorCode;
use crate::domains::points::LedgerError;

/// Reasons a scan is rejected, plus infrastructure failures
#[derive(Error, Debug)]
pub enum RedemptionError {
    #[error("QR code is required")]
    MissingCode,

    #[error("Invalid QR code")]
    UnknownCode,

    #[error("QR code is not active")]
    CodeInactive,

    #[error("QR code not yet valid")]
    CodeNotYetValid,

    #[error("QR code has expired")]
    CodeExpired,

    #[error("QR code already scanned")]
    AlreadyRedeemed,

    #[error("QR code scan limit reached")]
    ScanLimitReached,

    #[error("User not found")]
    UserNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ledger error: {0}")]
    Ledger(LedgerError),
}

impl From<LedgerError> for RedemptionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::UserNotFound => RedemptionError::UserNotFound,
            LedgerError::Database(e) => RedemptionError::Database(e),
            other => RedemptionError::Ledger(other),
        }
    }
}

impl RedemptionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RedemptionError::MissingCode => ErrorCode::ValidationFailed,
            RedemptionError::UnknownCode => ErrorCode::UnknownCode,
            RedemptionError::CodeInactive => ErrorCode::CodeInactive,
            RedemptionError::CodeNotYetValid => ErrorCode::CodeNotYetValid,
            RedemptionError::CodeExpired => ErrorCode::CodeExpired,
            RedemptionError::AlreadyRedeemed => ErrorCode::AlreadyRedeemed,
            RedemptionError::ScanLimitReached => ErrorCode::ScanLimitReached,
            RedemptionError::UserNotFound => ErrorCode::UserNotFound,
            RedemptionError::Database(_) => ErrorCode::InternalError,
            RedemptionError::Ledger(e) => e.code(),
        }
    }

    /// Expected business outcome rather than a fault
    pub fn is_rejection(&self) -> bool {
        !matches!(self, RedemptionError::Database(_) | RedemptionError::Ledger(_))
    }
}
