//! Test harness with testcontainers for integration testing.
//!
//! Uses a shared Postgres container across all tests in a binary.
//! The container and migrations are initialized once on first test, then reused.
//! Tests isolate themselves by using fresh phone numbers and QR code strings.

use anyhow::{Context, Result};
use axum::Router;
use chrono::Duration;
use rewards_core::domains::auth::JwtService;
use rewards_core::kernel::{MockSmsService, ServerDeps};
use rewards_core::server::build_router;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "test_issuer";

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let sent = send_otp("+15550001234", &ctx.deps).await.unwrap();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
    /// Recording SMS gateway shared with `deps`
    pub sms: Arc<MockSmsService>,
    /// Dependencies wired the way the server wires them, debug echo off
    pub deps: Arc<ServerDeps>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let sms = Arc::new(MockSmsService::new());
        let deps = Arc::new(Self::build_deps(&db_pool, sms.clone(), false));

        Ok(Self { db_pool, sms, deps })
    }

    /// Dependencies with a caller-supplied SMS mock and debug echo setting
    pub fn deps_with(&self, sms: Arc<MockSmsService>, otp_debug_echo: bool) -> Arc<ServerDeps> {
        Arc::new(Self::build_deps(&self.db_pool, sms, otp_debug_echo))
    }

    /// The HTTP router over this harness's dependencies
    pub fn router(&self) -> Router {
        build_router(self.deps.clone())
    }

    fn build_deps(pool: &PgPool, sms: Arc<MockSmsService>, otp_debug_echo: bool) -> ServerDeps {
        let jwt_service = Arc::new(JwtService::new(
            TEST_JWT_SECRET,
            TEST_JWT_ISSUER.to_string(),
            Duration::minutes(30),
            Duration::days(7),
        ));
        ServerDeps::new(pool.clone(), sms, jwt_service, otp_debug_echo)
    }
}
