use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::common::{PageWindow, PointsTransactionId, QrCodeId, UserId};
use crate::domains::points::errors::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "points_transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Earn,
    Spend,
    Expire,
    Bonus,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Earn => "earn",
            TransactionKind::Spend => "spend",
            TransactionKind::Expire => "expire",
            TransactionKind::Bonus => "bonus",
        }
    }

    /// Whether `amount` has the sign this kind of entry requires.
    ///
    /// Earn may be zero (zero-value codes still leave an audit entry); bonus
    /// is strictly positive; spend and expire are strictly negative.
    pub fn accepts(&self, amount: i32) -> bool {
        match self {
            TransactionKind::Earn => amount >= 0,
            TransactionKind::Bonus => amount > 0,
            TransactionKind::Spend | TransactionKind::Expire => amount < 0,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "points_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PointsSource {
    QrScan,
    Purchase,
    Referral,
    Bonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "points_reference_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    QrCode,
    Order,
    User,
}

/// What a ledger entry points back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointsReference {
    QrCode(QrCodeId),
    Order(String),
    User(UserId),
}

impl PointsReference {
    fn into_parts(self) -> (String, ReferenceType) {
        match self {
            PointsReference::QrCode(id) => (id.to_string(), ReferenceType::QrCode),
            PointsReference::Order(id) => (id, ReferenceType::Order),
            PointsReference::User(id) => (id.to_string(), ReferenceType::User),
        }
    }
}

/// Ledger row. Immutable once written.
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct PointsTransaction {
    pub id: PointsTransactionId,
    pub user_id: UserId,
    pub transaction_type: TransactionKind,
    pub amount: i32,
    pub balance_after: i32,
    pub source: PointsSource,
    pub reference_id: Option<String>,
    pub reference_type: Option<ReferenceType>,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A ledger entry that has passed sign validation but is not yet written.
///
/// Construct through [`NewPointsTransaction::new`] or one of the shorthands;
/// the amount is always signed the way its kind demands.
#[derive(Debug, Clone)]
pub struct NewPointsTransaction {
    user_id: UserId,
    kind: TransactionKind,
    amount: i32,
    source: PointsSource,
    reference: Option<PointsReference>,
    description: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl NewPointsTransaction {
    pub fn new(
        user_id: UserId,
        kind: TransactionKind,
        amount: i32,
        source: PointsSource,
    ) -> Result<Self, LedgerError> {
        if !kind.accepts(amount) {
            return Err(LedgerError::InvalidAmount { kind, amount });
        }
        Ok(Self {
            user_id,
            kind,
            amount,
            source,
            reference: None,
            description: None,
            expires_at: None,
        })
    }

    /// Award for a redeemed QR code
    pub fn qr_scan_award(
        user_id: UserId,
        qr_code_id: QrCodeId,
        points: i32,
        description: String,
    ) -> Result<Self, LedgerError> {
        Ok(
            Self::new(user_id, TransactionKind::Earn, points, PointsSource::QrScan)?
                .with_reference(PointsReference::QrCode(qr_code_id))
                .with_description(description),
        )
    }

    /// Debit of `points` (a positive number) against a purchase
    pub fn spend(user_id: UserId, points: i32) -> Result<Self, LedgerError> {
        let amount = points
            .checked_neg()
            .ok_or(LedgerError::InvalidAmount {
                kind: TransactionKind::Spend,
                amount: points,
            })?;
        Self::new(user_id, TransactionKind::Spend, amount, PointsSource::Purchase)
    }

    pub fn with_reference(mut self, reference: PointsReference) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }
}

/// Sum and count of one transaction kind for a user
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TypeTotals {
    pub transaction_type: TransactionKind,
    pub total_amount: i64,
    pub count: i64,
}

impl PointsTransaction {
    /// Append a ledger row. `balance_after` must be the balance produced by
    /// the adjustment made on the same connection.
    pub async fn insert(
        entry: NewPointsTransaction,
        balance_after: i32,
        conn: &mut PgConnection,
    ) -> Result<Self, sqlx::Error> {
        let (reference_id, reference_type) = match entry.reference {
            Some(reference) => {
                let (id, kind) = reference.into_parts();
                (Some(id), Some(kind))
            }
            None => (None, None),
        };

        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO points_transactions (
                id, user_id, transaction_type, amount, balance_after, source,
                reference_id, reference_type, description, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(PointsTransactionId::new())
        .bind(entry.user_id)
        .bind(entry.kind)
        .bind(entry.amount)
        .bind(balance_after)
        .bind(entry.source)
        .bind(reference_id)
        .bind(reference_type)
        .bind(entry.description)
        .bind(entry.expires_at)
        .fetch_one(conn)
        .await
    }

    /// Newest-first page of a user's entries, optionally of one kind
    pub async fn find_page_for_user(
        user_id: UserId,
        kind: Option<TransactionKind>,
        window: PageWindow,
        pool: &PgPool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM points_transactions
            WHERE user_id = $1
              AND ($2::points_transaction_type IS NULL OR transaction_type = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(pool)
        .await
    }

    pub async fn count_for_user(
        user_id: UserId,
        kind: Option<TransactionKind>,
        pool: &PgPool,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM points_transactions
            WHERE user_id = $1
              AND ($2::points_transaction_type IS NULL OR transaction_type = $2)
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .fetch_one(pool)
        .await
    }

    /// Per-kind sums and counts over all of a user's entries
    pub async fn totals_by_type(
        user_id: UserId,
        pool: &PgPool,
    ) -> Result<Vec<TypeTotals>, sqlx::Error> {
        sqlx::query_as::<_, TypeTotals>(
            r#"
            SELECT transaction_type,
                   COALESCE(SUM(amount), 0)::BIGINT AS total_amount,
                   COUNT(*) AS count
            FROM points_transactions
            WHERE user_id = $1
            GROUP BY transaction_type
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Sum of a user's active entries; equals `users.total_points` when consistent
    pub async fn sum_active(user_id: UserId, pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(amount), 0)::BIGINT
            FROM points_transactions
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_rules() {
        assert!(TransactionKind::Earn.accepts(10));
        assert!(TransactionKind::Earn.accepts(0));
        assert!(!TransactionKind::Earn.accepts(-1));
        assert!(TransactionKind::Bonus.accepts(5));
        assert!(!TransactionKind::Bonus.accepts(0));
        assert!(TransactionKind::Spend.accepts(-5));
        assert!(!TransactionKind::Spend.accepts(5));
        assert!(TransactionKind::Expire.accepts(-1));
        assert!(!TransactionKind::Expire.accepts(0));
    }

    #[test]
    fn test_constructor_rejects_wrong_sign() {
        let result = NewPointsTransaction::new(
            UserId::new(),
            TransactionKind::Spend,
            25,
            PointsSource::Purchase,
        );
        assert!(matches!(
            result,
            Err(LedgerError::InvalidAmount {
                kind: TransactionKind::Spend,
                amount: 25
            })
        ));
    }

    #[test]
    fn test_spend_negates_amount() {
        let entry = NewPointsTransaction::spend(UserId::new(), 40).unwrap();
        assert_eq!(entry.kind(), TransactionKind::Spend);
        assert_eq!(entry.amount(), -40);

        assert!(NewPointsTransaction::spend(UserId::new(), 0).is_err());
        assert!(NewPointsTransaction::spend(UserId::new(), -3).is_err());
    }

    #[test]
    fn test_qr_award_carries_reference() {
        let qr_code_id = QrCodeId::new();
        let entry = NewPointsTransaction::qr_scan_award(
            UserId::new(),
            qr_code_id,
            10,
            "Points earned from scanning Widget".to_string(),
        )
        .unwrap();

        assert_eq!(entry.kind(), TransactionKind::Earn);
        assert_eq!(entry.amount(), 10);
        assert_eq!(entry.source, PointsSource::QrScan);
        assert_eq!(entry.reference, Some(PointsReference::QrCode(qr_code_id)));
    }

    #[test]
    fn test_reference_parts() {
        let user_id = UserId::new();
        let (id, kind) = PointsReference::User(user_id).into_parts();
        assert_eq!(id, user_id.to_string());
        assert_eq!(kind, ReferenceType::User);

        let (id, kind) = PointsReference::Order("ORD-1".to_string()).into_parts();
        assert_eq!(id, "ORD-1");
        assert_eq!(kind, ReferenceType::Order);
    }

    #[test]
    fn test_kind_deserializes_from_query_value() {
        let kind: TransactionKind = serde_json::from_str("\"expire\"").unwrap();
        assert_eq!(kind, TransactionKind::Expire);
    }
}
