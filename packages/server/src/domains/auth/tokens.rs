//! Token issuer: mints access/refresh pairs and checks them against the
//! revocation set.

use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::errors::AuthError;
use super::hashing::hash_secret;
use super::jwt::{Claims, JwtService, TokenType};
use super::models::RevokedToken;
use super::types::TokenBundle;
use crate::common::UserId;
use crate::domains::users::models::{User, UserRole};

#[derive(Clone)]
pub struct TokenIssuer {
    jwt: Arc<JwtService>,
    pool: PgPool,
}

impl TokenIssuer {
    pub fn new(jwt: Arc<JwtService>, pool: PgPool) -> Self {
        Self { jwt, pool }
    }

    pub fn issue(
        &self,
        user_id: UserId,
        role: UserRole,
        token_type: TokenType,
    ) -> Result<String, AuthError> {
        self.jwt
            .create_token(user_id, role, token_type)
            .map_err(AuthError::Internal)
    }

    /// Mint a fresh access + refresh pair for the user
    pub fn issue_pair(&self, user: &User) -> Result<TokenBundle, AuthError> {
        Ok(TokenBundle {
            access_token: self.issue(user.id, user.role, TokenType::Access)?,
            refresh_token: self.issue(user.id, user.role, TokenType::Refresh)?,
            token_type: "bearer",
            expires_in: self.jwt.ttl(TokenType::Access).num_seconds(),
            user_id: user.id,
            role: user.role,
        })
    }

    /// Claims of a valid token of the expected type, or `None`.
    ///
    /// Never errors: bad signature, wrong issuer, expiry, wrong type and
    /// revocation all come back as `None`. A failed revocation lookup is
    /// treated as revoked.
    pub async fn verify(&self, token: &str, expected: TokenType) -> Option<Claims> {
        let claims = match self.jwt.verify_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Token rejected");
                return None;
            }
        };

        if claims.token_type != expected {
            debug!(
                expected = %expected,
                actual = %claims.token_type,
                "Token rejected: wrong type"
            );
            return None;
        }

        match RevokedToken::is_revoked(&hash_secret(token), &self.pool).await {
            Ok(false) => Some(claims),
            Ok(true) => {
                debug!(user_id = %claims.sub, "Token rejected: revoked");
                None
            }
            Err(e) => {
                error!(error = %e, "Revocation lookup failed");
                None
            }
        }
    }

    /// Add a token to the revocation set until it would stop verifying
    /// anyway (`exp + 1s`).
    ///
    /// Tokens that do not decode, or are already expired, need no entry and
    /// are skipped. Returns whether an entry was written.
    pub async fn revoke(&self, token: &str) -> Result<bool, AuthError> {
        let claims = match self.jwt.decode_ignoring_expiry(token) {
            Ok(claims) => claims,
            Err(_) => return Ok(false),
        };

        if claims.is_expired_at(Utc::now()) {
            return Ok(false);
        }

        let Some(expires_at) = claims.valid_until() else {
            return Ok(false);
        };

        let written = RevokedToken::insert(
            &hash_secret(token),
            claims.token_type,
            claims.sub,
            expires_at,
            &self.pool,
        )
        .await?;

        if written {
            info!(user_id = %claims.sub, token_type = %claims.token_type, "Token revoked");
        }

        Ok(written)
    }
}
