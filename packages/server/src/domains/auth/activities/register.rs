use serde::Deserialize;
use tracing::{info, warn};

use crate::common::{mask_phone, normalize_phone};
use crate::domains::auth::errors::AuthError;
use crate::domains::auth::types::TokenBundle;
use crate::domains::users::models::{NewUser, User};
use crate::kernel::ServerDeps;

/// Profile submitted at registration
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterProfile {
    pub phone_number: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub referral_code: Option<String>,
}

/// Create a user from an explicit profile and log them in.
pub async fn register(profile: RegisterProfile, deps: &ServerDeps) -> Result<TokenBundle, AuthError> {
    let phone_number = normalize_phone(&profile.phone_number).ok_or(AuthError::MalformedPhone)?;

    let email = non_blank(profile.email);
    if let Some(email) = &email {
        if !email.contains('@') {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
    }

    let referred_by = match non_blank(profile.referral_code) {
        Some(code) => match User::find_by_referral_code(&code, &deps.db_pool).await? {
            Some(referrer) => Some(referrer.id),
            None => {
                warn!(phone = %mask_phone(&phone_number), "Unknown referral code ignored");
                None
            }
        },
        None => None,
    };

    let new_user = NewUser {
        phone_number,
        email,
        first_name: non_blank(profile.first_name),
        last_name: non_blank(profile.last_name),
        role: Default::default(),
        referred_by,
        verified_login: true,
    };

    let user = User::create(&new_user, &deps.db_pool).await?;
    info!(
        user_id = %user.id,
        referred = user.referred_by.is_some(),
        "User registered"
    );

    deps.tokens.issue_pair(&user)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Ada ".to_string())).as_deref(), Some("Ada"));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}
