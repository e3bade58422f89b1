//! Integration tests for QR redemption: ordered checks, exactly-once awards
//! and capacity under concurrency.

mod common;

use crate::common::{
    create_logged_in_user, create_test_qr_code, create_test_user, create_windowed_qr_code,
    TestHarness,
};
use chrono::{Duration, Utc};
use rewards_core::common::{PageParams, UserId};
use rewards_core::domains::points::audit_balance;
use rewards_core::domains::points::models::{PointsSource, PointsTransaction, TransactionKind};
use rewards_core::domains::qr_codes::{redeem, scan_history, QrCode, QrScan, RedemptionError};
use rewards_core::domains::users::User;
use test_context::test_context;

async fn reload(ctx: &TestHarness, qr: &QrCode) -> QrCode {
    QrCode::find_by_code(&qr.code, &ctx.db_pool)
        .await
        .unwrap()
        .expect("code should exist")
}

async fn balance(ctx: &TestHarness, user: &User) -> i32 {
    User::balance(user.id, &ctx.db_pool).await.unwrap().unwrap()
}

async fn ledger_len(ctx: &TestHarness, user: &User) -> i64 {
    PointsTransaction::count_for_user(user.id, None, &ctx.db_pool)
        .await
        .unwrap()
}

// =============================================================================
// Happy path
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_scan_awards_points_once(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let qr = create_test_qr_code(&ctx.db_pool, 10, Some(1)).await.unwrap();

    let receipt = redeem(user.id, &qr.code, &ctx.deps).await.unwrap();
    assert_eq!(receipt.points_earned, 10);
    assert_eq!(receipt.balance_after, 10);
    assert_eq!(receipt.product_name.as_deref(), Some("Test Product"));
    assert_eq!(balance(ctx, &user).await, 10);

    let entries = PointsTransaction::find_page_for_user(
        user.id,
        None,
        PageParams::default().window(),
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.transaction_type, TransactionKind::Earn);
    assert_eq!(entry.source, PointsSource::QrScan);
    assert_eq!(entry.amount, 10);
    assert_eq!(entry.balance_after, 10);
    assert_eq!(entry.reference_id.as_deref(), Some(qr.id.to_string().as_str()));
    assert_eq!(
        entry.description.as_deref(),
        Some("Points earned from scanning QR code: Test Product")
    );

    let second = redeem(user.id, &qr.code, &ctx.deps).await;
    assert!(matches!(second, Err(RedemptionError::AlreadyRedeemed)));
    assert_eq!(balance(ctx, &user).await, 10);
    assert_eq!(ledger_len(ctx, &user).await, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_scan_updates_code_counters(ctx: &TestHarness) {
    let qr = create_test_qr_code(&ctx.db_pool, 25, None).await.unwrap();

    for _ in 0..3 {
        let user = create_test_user(&ctx.db_pool).await.unwrap();
        redeem(user.id, &qr.code, &ctx.deps).await.unwrap();
    }

    let qr = reload(ctx, &qr).await;
    assert_eq!(qr.current_scans, 3);
    assert_eq!(qr.total_points_awarded, 75);
    assert!(qr.last_scanned_at.is_some());
    assert_eq!(QrScan::count_for_code(qr.id, &ctx.db_pool).await.unwrap(), 3);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_code_is_trimmed(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let qr = create_test_qr_code(&ctx.db_pool, 5, None).await.unwrap();

    let receipt = redeem(user.id, &format!("  {}\n", qr.code), &ctx.deps)
        .await
        .unwrap();
    assert_eq!(receipt.points_earned, 5);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_zero_value_code_leaves_audit_entry(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let qr = create_test_qr_code(&ctx.db_pool, 0, None).await.unwrap();

    let receipt = redeem(user.id, &qr.code, &ctx.deps).await.unwrap();

    assert_eq!(receipt.balance_after, 0);
    assert_eq!(ledger_len(ctx, &user).await, 1);
}

// =============================================================================
// Rejections
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_empty_code(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let result = redeem(user.id, "   ", &ctx.deps).await;
    assert!(matches!(result, Err(RedemptionError::MissingCode)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_unknown_code(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let result = redeem(user.id, "QR-DOES-NOT-EXIST", &ctx.deps).await;
    assert!(matches!(result, Err(RedemptionError::UnknownCode)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_expired_code_mutates_nothing(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let now = Utc::now();
    let qr = create_windowed_qr_code(
        &ctx.db_pool,
        10,
        true,
        Some(now - Duration::days(30)),
        Some(now - Duration::days(1)),
    )
    .await
    .unwrap();

    let result = redeem(user.id, &qr.code, &ctx.deps).await;
    assert!(matches!(result, Err(RedemptionError::CodeExpired)));

    let qr = reload(ctx, &qr).await;
    assert_eq!(qr.current_scans, 0);
    assert_eq!(balance(ctx, &user).await, 0);
    assert_eq!(ledger_len(ctx, &user).await, 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_not_yet_valid_code(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let qr = create_windowed_qr_code(
        &ctx.db_pool,
        10,
        true,
        Some(Utc::now() + Duration::days(1)),
        None,
    )
    .await
    .unwrap();

    let result = redeem(user.id, &qr.code, &ctx.deps).await;
    assert!(matches!(result, Err(RedemptionError::CodeNotYetValid)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_inactive_code(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let qr = create_windowed_qr_code(&ctx.db_pool, 10, false, None, None)
        .await
        .unwrap();

    let result = redeem(user.id, &qr.code, &ctx.deps).await;
    assert!(matches!(result, Err(RedemptionError::CodeInactive)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_scan_limit_reached(ctx: &TestHarness) {
    let qr = create_test_qr_code(&ctx.db_pool, 10, Some(1)).await.unwrap();
    let first = create_test_user(&ctx.db_pool).await.unwrap();
    let second = create_test_user(&ctx.db_pool).await.unwrap();

    redeem(first.id, &qr.code, &ctx.deps).await.unwrap();
    let result = redeem(second.id, &qr.code, &ctx.deps).await;

    assert!(matches!(result, Err(RedemptionError::ScanLimitReached)));
    assert_eq!(balance(ctx, &second).await, 0);
    assert_eq!(reload(ctx, &qr).await.current_scans, 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_duplicate_reported_before_capacity(ctx: &TestHarness) {
    let qr = create_test_qr_code(&ctx.db_pool, 10, Some(1)).await.unwrap();
    let user = create_test_user(&ctx.db_pool).await.unwrap();

    redeem(user.id, &qr.code, &ctx.deps).await.unwrap();
    let result = redeem(user.id, &qr.code, &ctx.deps).await;

    assert!(matches!(result, Err(RedemptionError::AlreadyRedeemed)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_unknown_user(ctx: &TestHarness) {
    let qr = create_test_qr_code(&ctx.db_pool, 10, None).await.unwrap();

    let result = redeem(UserId::new(), &qr.code, &ctx.deps).await;

    assert!(matches!(result, Err(RedemptionError::UserNotFound)));
    assert_eq!(reload(ctx, &qr).await.current_scans, 0);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_user_concurrent_scans_award_once(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    let qr = create_test_qr_code(&ctx.db_pool, 10, None).await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let deps = ctx.deps.clone();
            let code = qr.code.clone();
            tokio::spawn(async move { redeem(user.id, &code, &deps).await })
        })
        .collect();

    let mut awarded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => awarded += 1,
            Err(RedemptionError::AlreadyRedeemed) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(awarded, 1);
    assert_eq!(balance(ctx, &user).await, 10);
    assert_eq!(ledger_len(ctx, &user).await, 1);
    assert_eq!(reload(ctx, &qr).await.current_scans, 1);
}

#[test_context(TestHarness)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_capacity_holds_under_contention(ctx: &TestHarness) {
    let qr = create_test_qr_code(&ctx.db_pool, 10, Some(3)).await.unwrap();

    let mut users = Vec::new();
    for _ in 0..10 {
        users.push(create_test_user(&ctx.db_pool).await.unwrap());
    }

    let handles: Vec<_> = users
        .iter()
        .map(|user| {
            let deps = ctx.deps.clone();
            let code = qr.code.clone();
            let user_id = user.id;
            tokio::spawn(async move { redeem(user_id, &code, &deps).await })
        })
        .collect();

    let mut awarded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => awarded += 1,
            Err(RedemptionError::ScanLimitReached) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    let qr = reload(ctx, &qr).await;
    assert_eq!(awarded, 3);
    assert_eq!(qr.current_scans, 3);
    assert_eq!(qr.total_points_awarded, 30);
    assert_eq!(QrScan::count_for_code(qr.id, &ctx.db_pool).await.unwrap(), 3);
}

// =============================================================================
// Scan history and ledger consistency
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_scan_history_is_newest_first(ctx: &TestHarness) {
    let (user, _) = create_logged_in_user(&ctx.deps).await.unwrap();
    let older = create_test_qr_code(&ctx.db_pool, 5, None).await.unwrap();
    let newer = create_test_qr_code(&ctx.db_pool, 7, None).await.unwrap();

    redeem(user.id, &older.code, &ctx.deps).await.unwrap();
    redeem(user.id, &newer.code, &ctx.deps).await.unwrap();

    let page = scan_history(user.id, &PageParams::default(), &ctx.deps)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].code, newer.code);
    assert_eq!(page.items[0].points_earned, 7);
    assert_eq!(page.items[1].code, older.code);

    let limited = scan_history(
        user.id,
        &PageParams {
            limit: Some(1),
            offset: Some(1),
        },
        &ctx.deps,
    )
    .await
    .unwrap();
    assert_eq!(limited.total, 2);
    assert_eq!(limited.items.len(), 1);
    assert_eq!(limited.items[0].code, older.code);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_balance_matches_ledger_after_scans(ctx: &TestHarness) {
    let user = create_test_user(&ctx.db_pool).await.unwrap();
    for points in [3, 11, 40] {
        let qr = create_test_qr_code(&ctx.db_pool, points, None).await.unwrap();
        redeem(user.id, &qr.code, &ctx.deps).await.unwrap();
    }

    let audit = audit_balance(user.id, &ctx.db_pool).await.unwrap();
    assert_eq!(audit.recorded_balance, 54);
    assert!(audit.is_consistent());
}
