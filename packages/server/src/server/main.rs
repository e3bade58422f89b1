// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use rewards_core::domains::auth::JwtService;
use rewards_core::kernel::{
    scheduled_tasks::start_scheduler, BaseSmsService, ServerDeps, TwilioSmsAdapter,
    UnconfiguredSms,
};
use rewards_core::{server::build_app, Config, Environment};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twilio::{TwilioOptions, TwilioService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rewards_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Rewards API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(environment = ?config.environment, "Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // SMS gateway
    let sms: Arc<dyn BaseSmsService> = match &config.twilio {
        Some(twilio) => Arc::new(TwilioSmsAdapter::new(Arc::new(TwilioService::new(
            TwilioOptions {
                account_sid: twilio.account_sid.clone(),
                auth_token: twilio.auth_token.clone(),
                from_number: twilio.from_number.clone(),
            },
        )))),
        None => {
            tracing::warn!("Twilio not configured; OTP codes will not be delivered");
            Arc::new(UnconfiguredSms)
        }
    };

    if config.otp_debug_echo && config.environment != Environment::Production {
        tracing::warn!("OTP debug echo enabled; undelivered codes are returned to clients");
    }

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        chrono::Duration::minutes(config.access_token_expire_minutes),
        chrono::Duration::days(config.refresh_token_expire_days),
    ));

    let deps = Arc::new(ServerDeps::new(
        pool.clone(),
        sms,
        jwt_service,
        config.otp_debug_echo,
    ));

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = start_scheduler(pool)
        .await
        .context("Failed to start scheduled tasks")?;

    // Build application
    let app = build_app(deps, &config.allowed_origins)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
