//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! - Credential store pruning: expired OTP challenges and revocation entries
//!   are deleted every ten minutes. Reads already treat them as absent.

use anyhow::Result;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::auth::models::{OtpChallenge, RevokedToken};

/// Start all scheduled tasks
pub async fn start_scheduler(pool: PgPool) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let prune_pool = pool.clone();
    let prune_job = Job::new_async("0 */10 * * * *", move |_uuid, _lock| {
        let pool = prune_pool.clone();
        Box::pin(async move {
            if let Err(e) = prune_credentials(&pool).await {
                tracing::error!("Credential pruning task failed: {}", e);
            }
        })
    })?;

    scheduler.add(prune_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (credential pruning every 10 minutes)");
    Ok(scheduler)
}

/// Delete expired OTP challenges and revocation entries
pub async fn prune_credentials(pool: &PgPool) -> Result<(u64, u64)> {
    let challenges = OtpChallenge::delete_expired(pool).await?;
    let revoked = RevokedToken::delete_expired(pool).await?;

    if challenges > 0 || revoked > 0 {
        tracing::info!(
            challenges,
            revoked,
            "Pruned expired credentials"
        );
    }

    Ok((challenges, revoked))
}
