use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use typed_builder::TypedBuilder;

use crate::common::UserId;
use crate::domains::users::errors::UserError;

const PHONE_UNIQUE_CONSTRAINT: &str = "users_phone_number_key";
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";
const REFERRAL_UNIQUE_CONSTRAINT: &str = "users_referral_code_key";

/// Referral code collisions are retried this many times before giving up
const REFERRAL_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Client,
    Admin,
    Retailer,
}

/// User model - SQL persistence layer
///
/// `total_points` is denormalised from the points ledger and only ever
/// changed through [`User::adjust_balance`].
#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub phone_number: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
    pub total_points: i32,
    pub referral_code: String,
    pub referred_by: Option<UserId>,
    pub login_count: i32,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile for a user about to be created.
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct NewUser {
    pub phone_number: String,
    #[builder(default, setter(strip_option))]
    pub email: Option<String>,
    #[builder(default, setter(strip_option))]
    pub first_name: Option<String>,
    #[builder(default, setter(strip_option))]
    pub last_name: Option<String>,
    #[builder(default)]
    pub role: UserRole,
    #[builder(default, setter(strip_option))]
    pub referred_by: Option<UserId>,
    /// Created by a successful OTP verification: starts verified with one login
    #[builder(default)]
    pub verified_login: bool,
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find user by phone number (exact match on the stored form)
    pub async fn find_by_phone(phone_number: &str, pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE phone_number = $1")
            .bind(phone_number)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_referral_code(
        referral_code: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE referral_code = $1")
            .bind(referral_code)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new user with zero points and a fresh referral code.
    ///
    /// Fails with `DuplicateUser` when the phone number (or email) is taken.
    pub async fn create(new_user: &NewUser, pool: &PgPool) -> Result<Self, UserError> {
        for _ in 0..REFERRAL_CODE_ATTEMPTS {
            let result = sqlx::query_as::<_, Self>(
                r#"
                INSERT INTO users (
                    id, phone_number, email, first_name, last_name, role,
                    is_verified, total_points, referral_code, referred_by,
                    login_count, last_login
                )
                VALUES (
                    $1, $2, $3, $4, $5, $6,
                    $7, 0, $8, $9,
                    CASE WHEN $7 THEN 1 ELSE 0 END,
                    CASE WHEN $7 THEN NOW() ELSE NULL END
                )
                RETURNING *
                "#,
            )
            .bind(UserId::new())
            .bind(&new_user.phone_number)
            .bind(&new_user.email)
            .bind(&new_user.first_name)
            .bind(&new_user.last_name)
            .bind(new_user.role)
            .bind(new_user.verified_login)
            .bind(generate_referral_code())
            .bind(new_user.referred_by)
            .fetch_one(pool)
            .await;

            match result {
                Ok(user) => return Ok(user),
                Err(sqlx::Error::Database(db_err)) => match db_err.constraint() {
                    Some(PHONE_UNIQUE_CONSTRAINT) | Some(EMAIL_UNIQUE_CONSTRAINT) => {
                        return Err(UserError::DuplicateUser)
                    }
                    Some(REFERRAL_UNIQUE_CONSTRAINT) => {
                        tracing::debug!("Referral code collision, retrying");
                        continue;
                    }
                    _ => return Err(UserError::Database(sqlx::Error::Database(db_err))),
                },
                Err(e) => return Err(e.into()),
            }
        }

        Err(UserError::Database(sqlx::Error::Protocol(
            "could not allocate a unique referral code".to_string(),
        )))
    }

    /// Record a successful login: bump the counter, stamp the time, mark verified.
    ///
    /// Single UPDATE so concurrent logins never lose an increment.
    pub async fn record_login(id: UserId, pool: &PgPool) -> Result<Self, UserError> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE users
            SET login_count = login_count + 1,
                last_login = NOW(),
                is_verified = TRUE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound)
    }

    /// Atomically add `delta` to the balance, refusing to go below zero.
    ///
    /// Returns the new balance, or `None` when the user does not exist or the
    /// balance would become negative. Callers distinguish the two.
    pub async fn adjust_balance(
        id: UserId,
        delta: i32,
        conn: &mut PgConnection,
    ) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET total_points = total_points + $2,
                updated_at = NOW()
            WHERE id = $1
              AND total_points + $2 >= 0
            RETURNING total_points
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(conn)
        .await
    }

    pub async fn exists(id: UserId, conn: &mut PgConnection) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Current balance as stored on the user row
    pub async fn balance(id: UserId, pool: &PgPool) -> Result<Option<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>("SELECT total_points FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// `TRS` followed by eight upper-case hex characters.
pub fn generate_referral_code() -> String {
    let mut bytes = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("TRS{}", hex::encode_upper(bytes))
}
