//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ServerDeps, TwilioSmsAdapter, UnconfiguredSms};
pub use test_dependencies::MockSmsService;
pub use traits::*;
