use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::common::UserId;
use crate::domains::points::{record_transaction, NewPointsTransaction};
use crate::domains::qr_codes::errors::RedemptionError;
use crate::domains::qr_codes::models::{QrCode, QrScan};
use crate::domains::qr_codes::types::{RedemptionStage, ScanReceipt};
use crate::kernel::ServerDeps;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Redeem a scanned code for the user.
///
/// Checks run in order and the first failure is returned. The award itself
/// is one database transaction: scan row, counter, balance, ledger entry.
pub async fn redeem(
    user_id: UserId,
    raw_code: &str,
    deps: &ServerDeps,
) -> Result<ScanReceipt, RedemptionError> {
    let result = run(user_id, raw_code.trim(), deps).await;

    match &result {
        Ok(receipt) => info!(
            user_id = %user_id,
            points = receipt.points_earned,
            balance_after = receipt.balance_after,
            stage = %RedemptionStage::Awarded,
            "QR code redeemed"
        ),
        Err(e) if e.is_rejection() => warn!(
            user_id = %user_id,
            code = %e.code(),
            stage = %RedemptionStage::Rejected,
            "QR redemption rejected"
        ),
        Err(e) => error!(
            user_id = %user_id,
            error = %e,
            stage = %RedemptionStage::Rejected,
            "QR redemption failed"
        ),
    }

    result
}

async fn run(user_id: UserId, code: &str, deps: &ServerDeps) -> Result<ScanReceipt, RedemptionError> {
    debug!(user_id = %user_id, stage = %RedemptionStage::Received);
    if code.is_empty() {
        return Err(RedemptionError::MissingCode);
    }

    let qr = QrCode::find_by_code(code, &deps.db_pool)
        .await?
        .ok_or(RedemptionError::UnknownCode)?;
    debug!(qr_code_id = %qr.id, stage = %RedemptionStage::CodeResolved);

    let now = Utc::now();
    qr.check_window(now)?;
    debug!(qr_code_id = %qr.id, stage = %RedemptionStage::WindowChecked);

    if QrScan::exists(qr.id, user_id, &deps.db_pool).await? {
        return Err(RedemptionError::AlreadyRedeemed);
    }
    debug!(qr_code_id = %qr.id, stage = %RedemptionStage::DuplicateChecked);

    if !qr.has_capacity() {
        return Err(RedemptionError::ScanLimitReached);
    }
    debug!(qr_code_id = %qr.id, stage = %RedemptionStage::CapacityChecked);

    award(&qr, user_id, now, deps).await
}

/// Perform the award, re-checking duplicate and capacity at write time.
///
/// Lock order is scan key, then code row, then user row.
async fn award(
    qr: &QrCode,
    user_id: UserId,
    now: DateTime<Utc>,
    deps: &ServerDeps,
) -> Result<ScanReceipt, RedemptionError> {
    let mut tx = deps.db_pool.begin().await?;

    match QrScan::insert_if_absent(qr.id, user_id, qr.points_value, now, &mut *tx).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(RedemptionError::AlreadyRedeemed),
        Err(e) => return Err(classify_insert_error(e)),
    }

    if QrCode::try_claim_slot(qr.id, qr.points_value, now, &mut *tx)
        .await?
        .is_none()
    {
        // The code changed between the read and the write; report why.
        let current = QrCode::find_by_id(qr.id, &mut *tx)
            .await?
            .ok_or(RedemptionError::UnknownCode)?;
        current.check_window(now)?;
        return Err(RedemptionError::ScanLimitReached);
    }

    let entry = NewPointsTransaction::qr_scan_award(
        user_id,
        qr.id,
        qr.points_value,
        format!(
            "Points earned from scanning QR code: {}",
            qr.display_name()
        ),
    )?;
    let ledger_entry = record_transaction(entry, &mut *tx).await?;

    tx.commit().await.map_err(classify_insert_error)?;

    Ok(ScanReceipt {
        points_earned: qr.points_value,
        product_name: qr.product_name.clone(),
        description: qr.description.clone(),
        scanned_at: now,
        balance_after: ledger_entry.balance_after,
    })
}

/// A unique violation on the scan key means another attempt for the same
/// pair won; a foreign key violation means the user row is gone.
fn classify_insert_error(err: sqlx::Error) -> RedemptionError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return RedemptionError::AlreadyRedeemed,
            Some(FOREIGN_KEY_VIOLATION) => return RedemptionError::UserNotFound,
            _ => {}
        }
    }
    RedemptionError::Database(err)
}
