//! OTP challenge manager: issue, store and consume one-time codes.

use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{info, warn};

use super::errors::AuthError;
use super::hashing::{hash_secret, matches_digest};
use super::models::OtpChallenge;
use crate::common::mask_phone;
use crate::kernel::BaseSmsService;

pub const OTP_LENGTH: usize = 6;
pub const OTP_TTL_SECS: i64 = 300;
/// Upper bound on waiting for the SMS gateway during `issue`
pub const SMS_DISPATCH_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Outcome of checking a submitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerdict {
    /// Matched and consumed
    Verified,
    /// A live challenge exists but the code differs
    Mismatch,
    /// No challenge stored (never issued or already consumed)
    Missing,
    /// Challenge present but past its TTL
    Expired,
}

impl OtpVerdict {
    pub fn is_verified(&self) -> bool {
        matches!(self, OtpVerdict::Verified)
    }

    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            OtpVerdict::Verified => Ok(()),
            OtpVerdict::Mismatch | OtpVerdict::Missing => Err(AuthError::InvalidOtp),
            OtpVerdict::Expired => Err(AuthError::CodeExpiredOrUnknown),
        }
    }
}

/// A freshly issued challenge
#[derive(Debug, Clone)]
pub struct IssuedChallenge {
    pub dispatched: bool,
    /// Set only when dispatch failed and the debug echo is enabled
    pub debug_code: Option<String>,
}

#[derive(Clone)]
pub struct OtpChallengeManager {
    pool: PgPool,
    sms: Arc<dyn BaseSmsService>,
    debug_echo: bool,
    dispatch_timeout: StdDuration,
}

impl OtpChallengeManager {
    pub fn new(pool: PgPool, sms: Arc<dyn BaseSmsService>, debug_echo: bool) -> Self {
        Self {
            pool,
            sms,
            debug_echo,
            dispatch_timeout: SMS_DISPATCH_TIMEOUT,
        }
    }

    pub fn with_dispatch_timeout(mut self, dispatch_timeout: StdDuration) -> Self {
        self.dispatch_timeout = dispatch_timeout;
        self
    }

    /// Generate and store a code for `phone_number`, then try to send it.
    ///
    /// The challenge stays issued even if the SMS cannot be delivered. A
    /// gateway that does not answer within the dispatch timeout counts as a
    /// failed dispatch.
    pub async fn issue(&self, phone_number: &str) -> Result<IssuedChallenge, AuthError> {
        let code = generate_code();
        let expires_at = Utc::now() + Duration::seconds(OTP_TTL_SECS);

        OtpChallenge::upsert(phone_number, &hash_secret(&code), expires_at, &self.pool).await?;
        info!(phone = %mask_phone(phone_number), "OTP challenge issued");

        let body = format!("Your verification code is: {}. Valid for 5 minutes.", code);
        let dispatched = match tokio::time::timeout(
            self.dispatch_timeout,
            self.sms.send_sms(phone_number, &body),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(
                    phone = %mask_phone(phone_number),
                    error = %e,
                    "OTP SMS dispatch failed"
                );
                false
            }
            Err(_) => {
                warn!(
                    phone = %mask_phone(phone_number),
                    timeout_ms = self.dispatch_timeout.as_millis() as u64,
                    "OTP SMS dispatch timed out"
                );
                false
            }
        };

        let debug_code = (!dispatched && self.debug_echo).then_some(code);

        Ok(IssuedChallenge {
            dispatched,
            debug_code,
        })
    }

    /// Check a submitted code, consuming the challenge on a match.
    ///
    /// Failed attempts leave the stored challenge untouched.
    pub async fn verify(&self, phone_number: &str, code: &str) -> Result<OtpVerdict, AuthError> {
        let mut tx = self.pool.begin().await?;

        let Some(challenge) = OtpChallenge::find_for_update(phone_number, &mut *tx).await? else {
            return Ok(OtpVerdict::Missing);
        };

        if challenge.is_expired(Utc::now()) {
            return Ok(OtpVerdict::Expired);
        }

        if !matches_digest(code.trim(), &challenge.code_hash) {
            return Ok(OtpVerdict::Mismatch);
        }

        OtpChallenge::delete(phone_number, &mut *tx).await?;
        tx.commit().await?;

        Ok(OtpVerdict::Verified)
    }
}

/// Six decimal digits from the OS RNG
pub fn generate_code() -> String {
    let n: u32 = OsRng.gen_range(0..1_000_000);
    format!("{:0width$}", n, width = OTP_LENGTH)
}
