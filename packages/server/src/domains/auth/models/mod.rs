pub mod otp_challenge;
pub mod revoked_token;

pub use otp_challenge::OtpChallenge;
pub use revoked_token::RevokedToken;
