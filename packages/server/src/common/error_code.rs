use serde::Serialize;

/// Stable, machine-readable outcome codes shared by every domain error.
///
/// Clients and tests match on these instead of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authentication
    InvalidOtp,
    CodeExpiredOrUnknown,
    InvalidOrExpiredToken,
    Unauthorized,

    // Validation
    MalformedPhone,
    ValidationFailed,
    UnknownCode,

    // Redemption window
    CodeInactive,
    CodeNotYetValid,
    CodeExpired,

    // State conflicts
    AlreadyRedeemed,
    ScanLimitReached,
    InsufficientBalance,
    DuplicateUser,
    UserNotFound,

    // Infrastructure
    InternalError,
}

/// Coarse class of an error, used by the transport layer to pick a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Authentication,
    Validation,
    NotFound,
    Conflict,
    Infrastructure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidOtp => "INVALID_OTP",
            ErrorCode::CodeExpiredOrUnknown => "CODE_EXPIRED_OR_UNKNOWN",
            ErrorCode::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::MalformedPhone => "MALFORMED_PHONE",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::UnknownCode => "UNKNOWN_CODE",
            ErrorCode::CodeInactive => "CODE_INACTIVE",
            ErrorCode::CodeNotYetValid => "CODE_NOT_YET_VALID",
            ErrorCode::CodeExpired => "CODE_EXPIRED",
            ErrorCode::AlreadyRedeemed => "ALREADY_REDEEMED",
            ErrorCode::ScanLimitReached => "SCAN_LIMIT_REACHED",
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::DuplicateUser => "DUPLICATE_USER",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            ErrorCode::InvalidOtp
            | ErrorCode::CodeExpiredOrUnknown
            | ErrorCode::InvalidOrExpiredToken
            | ErrorCode::Unauthorized => ErrorClass::Authentication,
            ErrorCode::MalformedPhone
            | ErrorCode::ValidationFailed
            | ErrorCode::UnknownCode
            | ErrorCode::CodeInactive
            | ErrorCode::CodeNotYetValid
            | ErrorCode::CodeExpired => ErrorClass::Validation,
            ErrorCode::UserNotFound => ErrorClass::NotFound,
            ErrorCode::AlreadyRedeemed
            | ErrorCode::ScanLimitReached
            | ErrorCode::InsufficientBalance
            | ErrorCode::DuplicateUser => ErrorClass::Conflict,
            ErrorCode::InternalError => ErrorClass::Infrastructure,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
