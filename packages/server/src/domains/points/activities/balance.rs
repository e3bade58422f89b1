use serde::Serialize;

use crate::common::UserId;
use crate::domains::points::errors::LedgerError;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Balance {
    pub user_id: UserId,
    pub total_points: i32,
}

pub async fn get_balance(user_id: UserId, deps: &ServerDeps) -> Result<Balance, LedgerError> {
    let total_points = User::balance(user_id, &deps.db_pool)
        .await?
        .ok_or(LedgerError::UserNotFound)?;

    Ok(Balance {
        user_id,
        total_points,
    })
}
