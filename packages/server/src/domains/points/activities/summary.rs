use std::collections::BTreeMap;

use crate::common::UserId;
use crate::domains::points::errors::LedgerError;
use crate::domains::points::models::{PointsTransaction, TransactionKind};
use crate::domains::points::types::PointsSummary;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Aggregate a user's ledger by transaction kind.
pub async fn summarize(user_id: UserId, deps: &ServerDeps) -> Result<PointsSummary, LedgerError> {
    let user = User::find_by_id(user_id, &deps.db_pool)
        .await?
        .ok_or(LedgerError::UserNotFound)?;

    let totals = PointsTransaction::totals_by_type(user_id, &deps.db_pool).await?;

    let mut summary = PointsSummary {
        total_points_earned: 0,
        total_points_spent: 0,
        total_points_expired: 0,
        current_balance: user.total_points,
        transaction_counts: BTreeMap::new(),
    };

    for row in totals {
        summary
            .transaction_counts
            .insert(row.transaction_type.as_str().to_string(), row.count);

        match row.transaction_type {
            TransactionKind::Earn => summary.total_points_earned = row.total_amount,
            TransactionKind::Spend => summary.total_points_spent = row.total_amount.abs(),
            TransactionKind::Expire => summary.total_points_expired = row.total_amount.abs(),
            TransactionKind::Bonus => {}
        }
    }

    Ok(summary)
}
