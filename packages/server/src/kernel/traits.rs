// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names (e.g., BaseSmsService)

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// SMS Service Trait (Infrastructure - OTP delivery)
// =============================================================================

#[async_trait]
pub trait BaseSmsService: Send + Sync {
    /// Send a text message to a phone number
    async fn send_sms(&self, to: &str, body: &str) -> Result<()>;
}
