// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::BaseSmsService;

// =============================================================================
// Mock SMS Service
// =============================================================================

/// A message captured by [`MockSmsService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

#[derive(Default)]
pub struct MockSmsService {
    sent: Arc<Mutex<Vec<SentSms>>>,
    failing: AtomicBool,
    hanging: AtomicBool,
}

impl MockSmsService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose sends always fail
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.set_failing(true);
        mock
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// A mock whose sends never complete, like an unresponsive gateway
    pub fn hanging() -> Self {
        let mock = Self::default();
        mock.hanging.store(true, Ordering::SeqCst);
        mock
    }

    /// Get all messages that were sent
    pub fn sent_messages(&self) -> Vec<SentSms> {
        self.sent.lock().unwrap().clone()
    }

    /// Digits of the most recent code sent to `to`, if any
    pub fn last_code_for(&self, to: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.to == to)
            .map(|m| m.body.chars().filter(|c| c.is_ascii_digit()).take(6).collect())
    }
}

#[async_trait]
impl BaseSmsService for MockSmsService {
    async fn send_sms(&self, to: &str, body: &str) -> Result<()> {
        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("mock SMS failure");
        }
        self.sent.lock().unwrap().push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_extracts_code() {
        let sms = MockSmsService::new();
        sms.send_sms(
            "+15550001111",
            "Your verification code is: 042917. Valid for 5 minutes.",
        )
        .await
        .unwrap();

        assert_eq!(sms.sent_messages().len(), 1);
        assert_eq!(sms.last_code_for("+15550001111").as_deref(), Some("042917"));
        assert_eq!(sms.last_code_for("+15550002222"), None);
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let sms = MockSmsService::failing();
        assert!(sms.send_sms("+15550001111", "hi").await.is_err());
        assert!(sms.sent_messages().is_empty());

        sms.set_failing(false);
        assert!(sms.send_sms("+15550001111", "hi").await.is_ok());
    }

    #[tokio::test]
    async fn test_hanging_mode_never_completes() {
        let sms = MockSmsService::hanging();
        let send = sms.send_sms("+15550001111", "hi");
        let outcome = tokio::time::timeout(std::time::Duration::from_millis(50), send).await;
        assert!(outcome.is_err());
        assert!(sms.sent_messages().is_empty());
    }
}
