use crate::common::{Page, PageParams, UserId};
use crate::domains::qr_codes::errors::RedemptionError;
use crate::domains::qr_codes::models::{QrScan, ScanHistoryEntry};
use crate::kernel::ServerDeps;

/// Newest-first page of the user's scans with the total count
pub async fn scan_history(
    user_id: UserId,
    params: &PageParams,
    deps: &ServerDeps,
) -> Result<Page<ScanHistoryEntry>, RedemptionError> {
    let window = params.window();

    let items = QrScan::find_history(user_id, window, &deps.db_pool).await?;
    let total = QrScan::count_for_user(user_id, &deps.db_pool).await?;

    Ok(Page::new(items, total, window))
}
