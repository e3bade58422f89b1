//! `/api/v1/qr-codes/*` handlers

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::common::{Page, PageParams};
use crate::domains::qr_codes::{self, ScanHistoryEntry, ScanReceipt};
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::middleware::AuthUser;
use crate::server::response::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub qr_code: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/scan", post(scan_handler))
        .route("/history", get(history_handler))
}

pub async fn scan_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<ScanRequest>,
) -> Result<ApiResponse<ScanReceipt>, ApiError> {
    let receipt = qr_codes::redeem(user.user_id, &body.qr_code, &state.deps).await?;
    Ok(ApiResponse::ok("QR code scanned successfully", receipt))
}

pub async fn history_handler(
    Extension(state): Extension<AxumAppState>,
    user: AuthUser,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<ApiResponse<Page<ScanHistoryEntry>>, ApiError> {
    let page = qr_codes::scan_history(user.user_id, &params, &state.deps).await?;
    Ok(ApiResponse::ok("Scan history retrieved successfully", page))
}
