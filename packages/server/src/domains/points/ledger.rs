use sqlx::{PgConnection, PgPool};
use tracing::info;

use super::errors::LedgerError;
use super::models::{NewPointsTransaction, PointsReference, PointsTransaction};
use super::types::BalanceAudit;
use crate::common::UserId;
use crate::domains::users::models::User;

/// Adjust the user's balance by the entry's amount and append the entry.
///
/// Both statements run on `conn`; callers pass a transaction so that the
/// balance change and its ledger row commit or roll back together.
pub async fn record_transaction(
    entry: NewPointsTransaction,
    conn: &mut PgConnection,
) -> Result<PointsTransaction, LedgerError> {
    let user_id = entry.user_id();
    let amount = entry.amount();

    let balance_after = match User::adjust_balance(user_id, amount, &mut *conn).await? {
        Some(balance) => balance,
        None if User::exists(user_id, &mut *conn).await? => {
            return Err(LedgerError::InsufficientBalance)
        }
        None => return Err(LedgerError::UserNotFound),
    };

    let transaction = PointsTransaction::insert(entry, balance_after, &mut *conn).await?;

    info!(
        user_id = %user_id,
        kind = %transaction.transaction_type,
        amount,
        balance_after,
        "Points ledger entry recorded"
    );

    Ok(transaction)
}

/// Debit `points` from a user for a purchase, atomically.
pub async fn spend_points(
    user_id: UserId,
    points: i32,
    reference: Option<PointsReference>,
    description: Option<String>,
    pool: &PgPool,
) -> Result<PointsTransaction, LedgerError> {
    let mut entry = NewPointsTransaction::spend(user_id, points)?;
    if let Some(reference) = reference {
        entry = entry.with_reference(reference);
    }
    if let Some(description) = description {
        entry = entry.with_description(description);
    }

    let mut tx = pool.begin().await?;
    let transaction = record_transaction(entry, &mut *tx).await?;
    tx.commit().await?;

    Ok(transaction)
}

/// Compare the denormalised balance with the sum of active ledger entries.
pub async fn audit_balance(user_id: UserId, pool: &PgPool) -> Result<BalanceAudit, LedgerError> {
    let recorded_balance = User::balance(user_id, pool)
        .await?
        .ok_or(LedgerError::UserNotFound)?;
    let ledger_sum = PointsTransaction::sum_active(user_id, pool).await?;

    Ok(BalanceAudit {
        recorded_balance,
        ledger_sum,
    })
}
