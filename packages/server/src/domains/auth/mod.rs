//! Auth domain - phone OTP login and bearer token lifecycle
//!
//! Responsibilities:
//! - OTP challenges: issue, deliver by SMS, consume once
//! - Access/refresh JWT issuance and verification
//! - Token revocation set (logout)

pub mod activities;
pub mod errors;
pub mod hashing;
pub mod jwt;
pub mod models;
pub mod otp;
pub mod tokens;
pub mod types;

pub use errors::AuthError;
pub use jwt::{Claims, JwtService, TokenType};
pub use otp::{OtpChallengeManager, OtpVerdict};
pub use tokens::TokenIssuer;
pub use types::{OtpSent, TokenBundle};
