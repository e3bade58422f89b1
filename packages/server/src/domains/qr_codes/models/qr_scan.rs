use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::common::{PageWindow, QrCodeId, QrScanId, UserId};

/// One successful redemption of a code by a user.
///
/// `UNIQUE (qr_code_id, user_id)` makes a second row for the same pair
/// impossible, whatever the interleaving.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct QrScan {
    pub id: QrScanId,
    pub qr_code_id: QrCodeId,
    pub user_id: UserId,
    pub scanned_at: DateTime<Utc>,
    pub points_earned: i32,
    pub is_valid: bool,
}

/// Scan row joined with the code it redeemed
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct ScanHistoryEntry {
    pub id: QrScanId,
    pub qr_code_id: QrCodeId,
    pub code: String,
    pub product_name: Option<String>,
    pub scanned_at: DateTime<Utc>,
    pub points_earned: i32,
    pub is_valid: bool,
}

impl QrScan {
    pub async fn exists(
        qr_code_id: QrCodeId,
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM qr_scans WHERE qr_code_id = $1 AND user_id = $2)",
        )
        .bind(qr_code_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Insert the scan row unless one already exists for the pair.
    ///
    /// A concurrent insert for the same pair blocks on the unique index until
    /// the other transaction finishes; if it committed, this returns `None`.
    pub async fn insert_if_absent(
        qr_code_id: QrCodeId,
        user_id: UserId,
        points_earned: i32,
        scanned_at: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO qr_scans (id, qr_code_id, user_id, scanned_at, points_earned, is_valid)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            ON CONFLICT (qr_code_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(QrScanId::new())
        .bind(qr_code_id)
        .bind(user_id)
        .bind(scanned_at)
        .bind(points_earned)
        .fetch_optional(conn)
        .await
    }

    pub async fn count_for_code(qr_code_id: QrCodeId, pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM qr_scans WHERE qr_code_id = $1")
            .bind(qr_code_id)
            .fetch_one(pool)
            .await
    }

    pub async fn count_for_user(user_id: UserId, pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM qr_scans WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Newest-first page of a user's scans
    pub async fn find_history(
        user_id: UserId,
        window: PageWindow,
        pool: &PgPool,
    ) -> Result<Vec<ScanHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, ScanHistoryEntry>(
            r#"
            SELECT s.id, s.qr_code_id, q.code, q.product_name,
                   s.scanned_at, s.points_earned, s.is_valid
            FROM qr_scans s
            JOIN qr_codes q ON q.id = s.qr_code_id
            WHERE s.user_id = $1
            ORDER BY s.scanned_at DESC, s.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(pool)
        .await
    }
}
