//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::get,
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::{self, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
}

/// Build the API router: `/api/v1/*`, `/health`, bearer auth and tracing.
///
/// Carries no CORS or rate limiting so tests can drive it directly.
pub fn build_router(deps: Arc<ServerDeps>) -> Router {
    let tokens = deps.tokens.clone();
    let app_state = AxumAppState { deps };

    let api = Router::new()
        .nest("/auth", routes::auth::router())
        .nest("/qr-codes", routes::qr_codes::router())
        .nest("/points", routes::points::router());

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(tokens.clone(), req, next)
        })) // JWT authentication
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
}

/// Build the production application: the router plus CORS and per-IP rate limiting.
pub fn build_app(deps: Arc<ServerDeps>, allowed_origins: &[String]) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(allow_origin(allowed_origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // 10 requests per second per IP with bursts up to 20
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers() // Extract IP from X-Forwarded-For header
            .finish()
            .context("Invalid rate limiter configuration")?,
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    Ok(build_router(deps).layer(rate_limit_layer).layer(cors))
}

fn allow_origin(allowed_origins: &[String]) -> AllowOrigin {
    if allowed_origins.is_empty() {
        return AllowOrigin::from(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    AllowOrigin::list(origins)
}
