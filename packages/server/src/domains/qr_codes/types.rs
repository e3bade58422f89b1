use chrono::{DateTime, Utc};
use serde::Serialize;

/// Stages a redemption attempt passes through, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionStage {
    Received,
    CodeResolved,
    WindowChecked,
    DuplicateChecked,
    CapacityChecked,
    Awarded,
    Rejected,
}

impl std::fmt::Display for RedemptionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RedemptionStage::Received => "received",
            RedemptionStage::CodeResolved => "code_resolved",
            RedemptionStage::WindowChecked => "window_checked",
            RedemptionStage::DuplicateChecked => "duplicate_checked",
            RedemptionStage::CapacityChecked => "capacity_checked",
            RedemptionStage::Awarded => "awarded",
            RedemptionStage::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Result of a successful scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReceipt {
    pub points_earned: i32,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub scanned_at: DateTime<Utc>,
    pub balance_after: i32,
}
