use tracing::info;

use crate::common::UserId;
use crate::domains::auth::errors::AuthError;
use crate::kernel::ServerDeps;

/// Revoke the caller's access token and the refresh token they present.
pub async fn logout(
    user_id: UserId,
    access_token: &str,
    refresh_token: &str,
    deps: &ServerDeps,
) -> Result<(), AuthError> {
    if refresh_token.trim().is_empty() {
        return Err(AuthError::Validation("refresh_token is required".to_string()));
    }

    let refresh_revoked = deps.tokens.revoke(refresh_token.trim()).await?;
    let access_revoked = deps.tokens.revoke(access_token).await?;

    info!(
        user_id = %user_id,
        access_revoked,
        refresh_revoked,
        "User logged out"
    );

    Ok(())
}
