use tracing::info;

use crate::common::{mask_phone, normalize_phone};
use crate::domains::auth::errors::AuthError;
use crate::domains::auth::types::TokenBundle;
use crate::domains::users::models::{NewUser, User};
use crate::domains::users::UserError;
use crate::kernel::ServerDeps;

/// Verify OTP code, create the user on first login, and return a token pair.
///
/// Existing users get their login recorded; new users are created verified
/// with a single login.
pub async fn verify_otp(
    phone_number: &str,
    code: &str,
    deps: &ServerDeps,
) -> Result<TokenBundle, AuthError> {
    let phone_number = normalize_phone(phone_number).ok_or(AuthError::MalformedPhone)?;

    deps.otp.verify(&phone_number, code).await?.into_result()?;

    let user = match User::find_by_phone(&phone_number, &deps.db_pool).await? {
        Some(user) => User::record_login(user.id, &deps.db_pool).await?,
        None => create_verified_user(&phone_number, deps).await?,
    };

    info!(user_id = %user.id, login_count = user.login_count, "OTP verified");

    deps.tokens.issue_pair(&user)
}

async fn create_verified_user(phone_number: &str, deps: &ServerDeps) -> Result<User, AuthError> {
    let new_user = NewUser::builder()
        .phone_number(phone_number)
        .verified_login(true)
        .build();

    match User::create(&new_user, &deps.db_pool).await {
        Ok(user) => {
            info!(user_id = %user.id, phone = %mask_phone(phone_number), "Created new user");
            Ok(user)
        }
        // Another request created the user between our lookup and insert
        Err(UserError::DuplicateUser) => {
            let user = User::find_by_phone(phone_number, &deps.db_pool)
                .await?
                .ok_or(AuthError::UserNotFound)?;
            Ok(User::record_login(user.id, &deps.db_pool).await?)
        }
        Err(e) => Err(e.into()),
    }
}
