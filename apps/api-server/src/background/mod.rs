//! Background jobs: housekeeping, and optionally the publish sweep.
//!
//! Posts are published to their platforms by an external publisher, which
//! writes `posted` itself. The in-process sweep stands in for it in
//! deployments without one and is off by default.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig};

use chrono::Utc;
use tokio_cron_scheduler::JobSchedulerError;

use crate::state::AppState;

/// Every minute, on the minute.
const PUBLISH_SCHEDULE: &str = "0 * * * * *";
/// Every ten minutes.
const MAINTENANCE_SCHEDULE: &str = "0 */10 * * * *";

/// Move every scheduled post whose time has passed to `posted`.
pub async fn publish_due_posts(state: &AppState) -> usize {
    match state.posts.mark_due_as_posted(Utc::now()).await {
        Ok(0) => 0,
        Ok(count) => {
            tracing::info!(count, "Published due posts");
            count
        }
        Err(e) => {
            tracing::error!(error = %e, "Publish sweep failed");
            0
        }
    }
}

/// Drop expired cache entries and idle rate-limit buckets.
pub async fn run_maintenance(state: &AppState) {
    if let Some(cache) = &state.memory_cache {
        let purged = cache.purge_expired().await;
        if purged > 0 {
            tracing::debug!(purged, "Purged expired cache entries");
        }
    }
    state.rate_limiter.prune();
}

/// Build the scheduler with the maintenance job, plus the publish sweep
/// when enabled, and start it unless the scheduler is disabled.
pub async fn start(state: AppState, config: SchedulerConfig) -> Result<Scheduler, JobSchedulerError> {
    let mut scheduler = Scheduler::new(config).await?;

    if scheduler.config().publish_sweep {
        let publish_state = state.clone();
        scheduler
            .add_cron("publish-due-posts", PUBLISH_SCHEDULE, move || {
                let state = publish_state.clone();
                async move {
                    publish_due_posts(&state).await;
                }
            })
            .await?;
    } else {
        tracing::info!("Publish sweep off, posts are marked posted by the external publisher");
    }

    scheduler
        .add_cron("maintenance", MAINTENANCE_SCHEDULE, move || {
            let state = state.clone();
            async move { run_maintenance(&state).await }
        })
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}
