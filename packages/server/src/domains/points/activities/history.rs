use serde::Deserialize;

use crate::common::{Page, PageParams, UserId};
use crate::domains::points::errors::LedgerError;
use crate::domains::points::models::{PointsTransaction, TransactionKind};
use crate::kernel::ServerDeps;

/// Query string for the transaction history endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub transaction_type: Option<TransactionKind>,
}

/// Newest-first page of ledger entries plus the total matching count
pub async fn get_history(
    user_id: UserId,
    query: &HistoryQuery,
    deps: &ServerDeps,
) -> Result<Page<PointsTransaction>, LedgerError> {
    let window = PageParams {
        limit: query.limit,
        offset: query.offset,
    }
    .window();

    let items = PointsTransaction::find_page_for_user(
        user_id,
        query.transaction_type,
        window,
        &deps.db_pool,
    )
    .await?;
    let total =
        PointsTransaction::count_for_user(user_id, query.transaction_type, &deps.db_pool).await?;

    Ok(Page::new(items, total, window))
}
