use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Longest accepted access token lifetime (one day)
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 24 * 60;
/// Longest accepted refresh token lifetime (one year)
pub const MAX_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 365;

/// Deployment environment. Debug conveniences are refused in `Production`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(anyhow::anyhow!("Invalid APP_ENV: {}", other)),
        }
    }
}

/// Twilio messaging credentials; present only when all three vars are set.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub environment: Environment,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    /// Return undelivered OTP codes in the send-otp response (never in production)
    pub otp_debug_echo: bool,
    pub twilio: Option<TwilioConfig>,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment: Environment = lookup("APP_ENV")
            .unwrap_or_else(|| "development".to_string())
            .parse()?;

        let otp_debug_echo = parse_bool(lookup("OTP_DEBUG_ECHO").as_deref())
            .context("OTP_DEBUG_ECHO must be true or false")?;

        if otp_debug_echo && environment == Environment::Production {
            bail!("OTP_DEBUG_ECHO must not be enabled when APP_ENV=production");
        }

        let twilio = match (
            lookup("TWILIO_ACCOUNT_SID"),
            lookup("TWILIO_AUTH_TOKEN"),
            lookup("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number))
                if !account_sid.is_empty() && !auth_token.is_empty() && !from_number.is_empty() =>
            {
                Some(TwilioConfig {
                    account_sid,
                    auth_token,
                    from_number,
                })
            }
            _ => None,
        };

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let access_token_expire_minutes: i64 = lookup("ACCESS_TOKEN_EXPIRE_MINUTES")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a valid number")?;
        let refresh_token_expire_days: i64 = lookup("REFRESH_TOKEN_EXPIRE_DAYS")
            .unwrap_or_else(|| "7".to_string())
            .parse()
            .context("REFRESH_TOKEN_EXPIRE_DAYS must be a valid number")?;
        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&access_token_expire_minutes) {
            bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {}",
                MAX_ACCESS_TOKEN_EXPIRE_MINUTES
            );
        }
        if !(1..=MAX_REFRESH_TOKEN_EXPIRE_DAYS).contains(&refresh_token_expire_days) {
            bail!(
                "REFRESH_TOKEN_EXPIRE_DAYS must be between 1 and {}",
                MAX_REFRESH_TOKEN_EXPIRE_DAYS
            );
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            environment,
            jwt_secret,
            jwt_issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "rewards-api".to_string()),
            access_token_expire_minutes,
            refresh_token_expire_days,
            otp_debug_echo,
            twilio,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn parse_bool(value: Option<&str>) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v.is_empty() || v == "false" || v == "0" => Ok(false),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) => Err(anyhow::anyhow!("not a boolean: {}", v)),
    }
}
