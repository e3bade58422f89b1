use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::UserId;
use crate::domains::auth::jwt::TokenType;

/// Revocation set entry, keyed by the digest of the raw token.
///
/// Live until `expires_at`, the first instant at which the token itself fails
/// verification (`exp + 1s`); after that the row can be pruned.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct RevokedToken {
    pub token_hash: String,
    pub token_type: TokenType,
    pub user_id: UserId,
    pub revoked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RevokedToken {
    /// Add a token to the set. Revoking twice is a no-op; returns whether a
    /// row was written.
    pub async fn insert(
        token_hash: &str,
        token_type: TokenType,
        user_id: UserId,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO revoked_tokens (token_hash, token_type, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (token_hash) DO NOTHING
            "#,
        )
        .bind(token_hash)
        .bind(token_type)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_revoked(token_hash: &str, pool: &PgPool) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE token_hash = $1 AND expires_at > NOW())",
        )
        .bind(token_hash)
        .fetch_one(pool)
        .await
    }

    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
