use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::common::UserId;
use crate::domains::auth::{TokenIssuer, TokenType};
use crate::domains::users::models::UserRole;
use crate::server::error::ApiError;

/// Authenticated user information from a verified access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: UserId,
    pub role: UserRole,
    /// The raw bearer token, kept so logout can revoke it
    pub access_token: String,
}

/// JWT authentication middleware
///
/// Extracts the bearer token, verifies it through the token issuer (access
/// type, not revoked) and adds AuthUser to request extensions. Requests
/// without a valid token continue unauthenticated; handlers that need a user
/// reject via the `AuthUser` extractor.
pub async fn jwt_auth_middleware(
    tokens: TokenIssuer,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = extract_auth_user(request.headers(), &tokens).await {
        debug!("Authenticated user: {} ({:?})", user.user_id, user.role);
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Token from `Authorization: Bearer <token>` (or a bare token)
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();
    (!token.is_empty()).then_some(token)
}

async fn extract_auth_user(headers: &HeaderMap, tokens: &TokenIssuer) -> Option<AuthUser> {
    let token = bearer_token(headers)?;
    let claims = tokens.verify(token, TokenType::Access).await?;

    Some(AuthUser {
        user_id: claims.sub,
        role: claims.role,
        access_token: token.to_string(),
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token_with_bearer() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_extract_token_without_bearer() {
        assert_eq!(bearer_token(&headers("abc.def.ghi")), Some("abc.def.ghi"));
    }

    #[test]
    fn test_no_auth_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_empty_bearer() {
        assert_eq!(bearer_token(&headers("Bearer ")), None);
    }

    #[tokio::test]
    async fn test_extractor_rejects_without_user() {
        let request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.code, crate::common::ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_extractor_reads_extension() {
        let user_id = UserId::new();
        let mut request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        request.extensions_mut().insert(AuthUser {
            user_id,
            role: UserRole::Client,
            access_token: "token".to_string(),
        });
        let (mut parts, _) = request.into_parts();

        let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.user_id, user_id);
    }
}
