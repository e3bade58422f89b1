use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use typed_builder::TypedBuilder;

use crate::common::QrCodeId;
use crate::domains::qr_codes::errors::RedemptionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "qr_code_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QrCodeType {
    #[default]
    Product,
    Reward,
    Event,
}

/// Redeemable QR code
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct QrCode {
    pub id: QrCodeId,
    pub code: String,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub code_type: QrCodeType,
    pub points_value: i32,
    pub is_active: bool,
    /// `None` means unlimited
    pub max_scans: Option<i32>,
    pub current_scans: i32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub last_scanned_at: Option<DateTime<Utc>>,
    pub total_points_awarded: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for seeding a new code
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewQrCode {
    pub code: String,
    pub points_value: i32,
    #[builder(default, setter(strip_option))]
    pub product_id: Option<String>,
    #[builder(default, setter(strip_option))]
    pub product_name: Option<String>,
    #[builder(default, setter(strip_option))]
    pub description: Option<String>,
    #[builder(default)]
    pub code_type: QrCodeType,
    #[builder(default = true)]
    pub is_active: bool,
    #[builder(default, setter(strip_option))]
    pub max_scans: Option<i32>,
    #[builder(default, setter(strip_option))]
    pub valid_from: Option<DateTime<Utc>>,
    #[builder(default, setter(strip_option))]
    pub valid_until: Option<DateTime<Utc>>,
}

impl QrCode {
    /// Active flag and validity window. Missing bounds are unbounded; both
    /// bounds are inclusive.
    pub fn check_window(&self, now: DateTime<Utc>) -> Result<(), RedemptionError> {
        if !self.is_active {
            return Err(RedemptionError::CodeInactive);
        }
        if self.valid_from.is_some_and(|from| now < from) {
            return Err(RedemptionError::CodeNotYetValid);
        }
        if self.valid_until.is_some_and(|until| now > until) {
            return Err(RedemptionError::CodeExpired);
        }
        Ok(())
    }

    pub fn has_capacity(&self) -> bool {
        self.max_scans
            .map_or(true, |max_scans| self.current_scans < max_scans)
    }

    /// Label used in ledger descriptions
    pub fn display_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or("Unknown")
    }

    pub async fn find_by_code(code: &str, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM qr_codes WHERE code = $1")
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(
        id: QrCodeId,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM qr_codes WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn create(new_code: &NewQrCode, pool: &PgPool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO qr_codes (
                id, code, product_id, product_name, description, code_type,
                points_value, is_active, max_scans, valid_from, valid_until
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(QrCodeId::new())
        .bind(&new_code.code)
        .bind(&new_code.product_id)
        .bind(&new_code.product_name)
        .bind(&new_code.description)
        .bind(new_code.code_type)
        .bind(new_code.points_value)
        .bind(new_code.is_active)
        .bind(new_code.max_scans)
        .bind(new_code.valid_from)
        .bind(new_code.valid_until)
        .fetch_one(pool)
        .await
    }

    /// Take one scan slot if the code is still redeemable at `now`.
    ///
    /// Increment-if-less-than in a single UPDATE: concurrent callers are
    /// serialised on the row and each re-evaluates the predicate against the
    /// committed counter. Returns `None` when no slot was taken.
    pub async fn try_claim_slot(
        id: QrCodeId,
        points: i32,
        now: DateTime<Utc>,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE qr_codes
            SET current_scans = current_scans + 1,
                total_points_awarded = total_points_awarded + $3,
                last_scanned_at = $2,
                updated_at = NOW()
            WHERE id = $1
              AND is_active
              AND (valid_from IS NULL OR valid_from <= $2)
              AND (valid_until IS NULL OR valid_until >= $2)
              AND (max_scans IS NULL OR current_scans < max_scans)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(i64::from(points))
        .fetch_optional(conn)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn code() -> QrCode {
        let now = Utc::now();
        QrCode {
            id: QrCodeId::new(),
            code: "QR-TEST".to_string(),
            product_id: None,
            product_name: Some("Widget".to_string()),
            description: None,
            code_type: QrCodeType::Product,
            points_value: 10,
            is_active: true,
            max_scans: None,
            current_scans: 0,
            valid_from: None,
            valid_until: None,
            last_scanned_at: None,
            total_points_awarded: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_open_window_accepts() {
        assert!(code().check_window(Utc::now()).is_ok());
    }

    #[test]
    fn test_inactive_wins_over_window() {
        let now = Utc::now();
        let mut qr = code();
        qr.is_active = false;
        qr.valid_until = Some(now - Duration::days(1));
        assert!(matches!(
            qr.check_window(now),
            Err(RedemptionError::CodeInactive)
        ));
    }

    #[test]
    fn test_not_yet_valid() {
        let now = Utc::now();
        let mut qr = code();
        qr.valid_from = Some(now + Duration::hours(1));
        assert!(matches!(
            qr.check_window(now),
            Err(RedemptionError::CodeNotYetValid)
        ));
    }

    #[test]
    fn test_expired() {
        let now = Utc::now();
        let mut qr = code();
        qr.valid_until = Some(now - Duration::seconds(1));
        assert!(matches!(qr.check_window(now), Err(RedemptionError::CodeExpired)));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let now = Utc::now();
        let mut qr = code();
        qr.valid_from = Some(now);
        qr.valid_until = Some(now);
        assert!(qr.check_window(now).is_ok());
    }

    #[test]
    fn test_capacity() {
        let mut qr = code();
        assert!(qr.has_capacity());

        qr.max_scans = Some(2);
        qr.current_scans = 1;
        assert!(qr.has_capacity());

        qr.current_scans = 2;
        assert!(!qr.has_capacity());

        qr.max_scans = Some(0);
        qr.current_scans = 0;
        assert!(!qr.has_capacity());
    }

    #[test]
    fn test_display_name_falls_back() {
        let mut qr = code();
        assert_eq!(qr.display_name(), "Widget");
        qr.product_name = None;
        assert_eq!(qr.display_name(), "Unknown");
    }
}
