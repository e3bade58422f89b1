//! `/api/v1/points/*` handlers

use axum::{extract::Extension, routing::get, Router};

use crate::common::Page;
use crate::domains::points::activities::{self, balance::Balance, HistoryQuery};
use crate::domains::points::{PointsSummary, PointsTransaction};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::extract::ApiQuery;
use crate::server::middleware::AuthUser;
use crate::server::response::ApiResponse;

pub fn router() -> Router {
    Router::new()
        .route("/balance", get(balance_handler))
        .route("/summary", get(summary_handler))
        .route("/transactions", get(transactions_handler))
}

pub async fn balance_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
) -> Result<ApiResponse<Balance>, ApiError> {
    let balance = activities::get_balance(user.user_id, &state.deps).await?;
    Ok(ApiResponse::ok("Points balance retrieved successfully", balance))
}

pub async fn summary_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
) -> Result<ApiResponse<PointsSummary>, ApiError> {
    let summary = activities::summarize(user.user_id, &state.deps).await?;
    Ok(ApiResponse::ok("Points summary retrieved successfully", summary))
}

pub async fn transactions_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<ApiResponse<Page<PointsTransaction>>, ApiError> {
    let page = activities::get_history(user.user_id, &query, &state.deps).await?;
    Ok(ApiResponse::ok("Points transactions retrieved successfully", page))
}
