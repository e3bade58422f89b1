use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::UserId;
use crate::domains::users::models::UserRole;

/// Which of the two bearer tokens a JWT is. Carried in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "token_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => write!(f, "access"),
            TokenType::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT Claims - data stored in the token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: UserId,    // Subject (user id)
    pub role: UserRole, // Role at issue time
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub exp: i64,    // Expiration timestamp
    pub iat: i64,    // Issued at timestamp
    pub iss: String, // Issuer
    pub jti: String, // JWT ID (unique token identifier)
}

impl Claims {
    /// Past `exp`. Verification runs with zero leeway and still accepts the
    /// token during the second `exp` itself.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }

    /// First instant at which the token no longer verifies (`exp + 1s`).
    pub fn valid_until(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.exp.checked_add(1)?, 0)
    }
}

/// JWT Service - signs and verifies HS256 tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    /// Create new JWT service with secret, issuer and per-type lifetimes
    pub fn new(secret: &str, issuer: String, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }

    /// Create a signed token of the given type for a user
    pub fn create_token(
        &self,
        user_id: UserId,
        role: UserRole,
        token_type: TokenType,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.ttl(token_type);

        let claims = Claims {
            sub: user_id,
            role,
            token_type,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify signature, issuer and expiry, and decode the claims
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }

    /// Decode a token whose signature is valid, ignoring `exp`.
    ///
    /// Used on logout, where an expired token just needs no blacklist entry.
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}
