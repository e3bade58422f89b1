use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

/// Live OTP challenge for a phone number. At most one per phone.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct OtpChallenge {
    pub phone_number: String,
    pub code_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Store a challenge, replacing any previous one for the phone
    pub async fn upsert(
        phone_number: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO otp_challenges (phone_number, code_hash, issued_at, expires_at)
            VALUES ($1, $2, NOW(), $3)
            ON CONFLICT (phone_number) DO UPDATE
            SET code_hash = EXCLUDED.code_hash,
                issued_at = EXCLUDED.issued_at,
                expires_at = EXCLUDED.expires_at
            RETURNING *
            "#,
        )
        .bind(phone_number)
        .bind(code_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Fetch and row-lock the challenge so only one verifier can consume it
    pub async fn find_for_update(
        phone_number: &str,
        conn: &mut PgConnection,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM otp_challenges WHERE phone_number = $1 FOR UPDATE",
        )
        .bind(phone_number)
        .fetch_optional(conn)
        .await
    }

    pub async fn delete(phone_number: &str, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM otp_challenges WHERE phone_number = $1")
            .bind(phone_number)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Remove challenges past their TTL; returns how many were removed
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM otp_challenges WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
