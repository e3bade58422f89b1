use crate::domains::auth::errors::AuthError;
use crate::domains::auth::jwt::TokenType;
use crate::domains::auth::types::TokenBundle;
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// Exchange a valid refresh token for a new pair.
///
/// The presented refresh token stays valid until it expires or is revoked.
pub async fn refresh(refresh_token: &str, deps: &ServerDeps) -> Result<TokenBundle, AuthError> {
    let claims = deps
        .tokens
        .verify(refresh_token, TokenType::Refresh)
        .await
        .ok_or(AuthError::InvalidOrExpiredToken)?;

    let user = User::find_by_id(claims.sub, &deps.db_pool)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    deps.tokens.issue_pair(&user)
}
