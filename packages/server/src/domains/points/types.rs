use serde::Serialize;
use std::collections::BTreeMap;

/// Read-side aggregation of a user's ledger.
///
/// Spent and expired totals are reported as absolute values. Bonus entries
/// only show up in `transaction_counts`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PointsSummary {
    pub total_points_earned: i64,
    pub total_points_spent: i64,
    pub total_points_expired: i64,
    pub current_balance: i32,
    pub transaction_counts: BTreeMap<String, i64>,
}

/// Denormalised balance next to what the ledger says it should be.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct BalanceAudit {
    pub recorded_balance: i32,
    pub ledger_sum: i64,
}

impl BalanceAudit {
    pub fn is_consistent(&self) -> bool {
        i64::from(self.recorded_balance) == self.ledger_sum
    }
}
