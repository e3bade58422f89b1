//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! activities. External services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use twilio::TwilioService;

use crate::domains::auth::{JwtService, OtpChallengeManager, TokenIssuer};
use crate::kernel::BaseSmsService;

// =============================================================================
// TwilioService Adapter (implements BaseSmsService trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseSmsService trait
pub struct TwilioSmsAdapter(pub Arc<TwilioService>);

impl TwilioSmsAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseSmsService for TwilioSmsAdapter {
    async fn send_sms(&self, to: &str, body: &str) -> Result<()> {
        self.0
            .send_sms(to, body)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}

/// Used when no SMS gateway is configured; every send fails.
pub struct UnconfiguredSms;

#[async_trait]
impl BaseSmsService for UnconfiguredSms {
    async fn send_sms(&self, _to: &str, _body: &str) -> Result<()> {
        anyhow::bail!("SMS gateway not configured")
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to activities
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub sms: Arc<dyn BaseSmsService>,
    /// JWT service for token signing
    pub jwt_service: Arc<JwtService>,
    pub tokens: TokenIssuer,
    pub otp: OtpChallengeManager,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: PgPool,
        sms: Arc<dyn BaseSmsService>,
        jwt_service: Arc<JwtService>,
        otp_debug_echo: bool,
    ) -> Self {
        let tokens = TokenIssuer::new(jwt_service.clone(), db_pool.clone());
        let otp = OtpChallengeManager::new(db_pool.clone(), sms.clone(), otp_debug_echo);

        Self {
            db_pool,
            sms,
            jwt_service,
            tokens,
            otp,
        }
    }
}
