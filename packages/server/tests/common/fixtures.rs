//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rewards_core::domains::auth::TokenBundle;
use rewards_core::domains::qr_codes::{NewQrCode, QrCode};
use rewards_core::domains::users::{NewUser, User};
use rewards_core::kernel::ServerDeps;
use sqlx::PgPool;
use uuid::Uuid;

/// A phone number no other test uses: `+1` followed by ten digits
pub fn unique_phone() -> String {
    let n = Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("+1{:010}", n)
}

/// A QR code string no other test uses
pub fn unique_code() -> String {
    format!("QR-{}", Uuid::new_v4().simple())
}

pub async fn create_test_user(pool: &PgPool) -> Result<User> {
    let new_user = NewUser::builder().phone_number(unique_phone()).build();
    Ok(User::create(&new_user, pool).await?)
}

/// Active code with an open window
pub async fn create_test_qr_code(
    pool: &PgPool,
    points_value: i32,
    max_scans: Option<i32>,
) -> Result<QrCode> {
    let new_code = NewQrCode {
        code: unique_code(),
        points_value,
        product_id: Some("SKU-1".to_string()),
        product_name: Some("Test Product".to_string()),
        description: Some("Test product description".to_string()),
        code_type: Default::default(),
        is_active: true,
        max_scans,
        valid_from: None,
        valid_until: None,
    };
    Ok(QrCode::create(&new_code, pool).await?)
}

/// Code with an explicit window and active flag
pub async fn create_windowed_qr_code(
    pool: &PgPool,
    points_value: i32,
    is_active: bool,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
) -> Result<QrCode> {
    let new_code = NewQrCode {
        code: unique_code(),
        points_value,
        product_id: None,
        product_name: Some("Windowed Product".to_string()),
        description: None,
        code_type: Default::default(),
        is_active,
        max_scans: None,
        valid_from,
        valid_until,
    };
    Ok(QrCode::create(&new_code, pool).await?)
}

/// Create a user and mint a token pair for them
pub async fn create_logged_in_user(deps: &ServerDeps) -> Result<(User, TokenBundle)> {
    let user = create_test_user(&deps.db_pool).await?;
    let tokens = deps.tokens.issue_pair(&user)?;
    Ok((user, tokens))
}
