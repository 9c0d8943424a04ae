//! Thin wrapper over tokio-cron-scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// Flip due scheduled posts to posted in-process. Off unless no external
    /// publisher writes `posted` for this deployment.
    pub publish_sweep: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            publish_sweep: false,
        }
    }
}

fn flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: flag("SCHEDULER_ENABLED", defaults.enabled),
            publish_sweep: flag("PUBLISH_SWEEP_ENABLED", defaults.publish_sweep),
        }
    }
}

/// Resets the running flag even if the job panics.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
    jobs: Vec<(&'static str, Uuid)>,
}

impl Scheduler {
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self {
            inner,
            config,
            jobs: Vec::new(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Registered jobs by name.
    pub fn jobs(&self) -> &[(&'static str, Uuid)] {
        &self.jobs
    }

    /// Register `task` on a six-field cron `schedule` (seconds first).
    ///
    /// A tick that fires while the previous run of the same job is still
    /// going is skipped.
    pub async fn add_cron<F, Fut>(
        &mut self,
        name: &'static str,
        schedule: &str,
        task: F,
    ) -> Result<Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(false));

        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            let running = running.clone();
            Box::pin(async move {
                if running.swap(true, Ordering::AcqRel) {
                    tracing::warn!(job = name, "Previous run still in progress, skipping tick");
                    return;
                }
                let _guard = RunGuard(running);

                let started = Instant::now();
                task().await;
                tracing::debug!(
                    job = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Job finished"
                );
            })
        })?;

        let id = self.inner.add(job).await?;
        self.jobs.push((name, id));
        tracing::info!(job = name, schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!(jobs = self.jobs.len(), "Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn test_jobs_are_registered_by_name() {
        let mut scheduler = Scheduler::new(SchedulerConfig {
            enabled: false,
            ..SchedulerConfig::default()
        })
        .await
        .unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        scheduler
            .add_cron("tick", "0 * * * * *", move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await
            .unwrap();

        assert!(!scheduler.is_enabled());
        assert_eq!(scheduler.jobs().len(), 1);
        assert_eq!(scheduler.jobs()[0].0, "tick");
        // Disabled schedulers never start, so nothing ran.
        scheduler.start().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
