//! Consumer side of the notification pipeline.
//!
//! The worker leases jobs from a [`JobQueue`] and runs up to `concurrency`
//! of them at once. Each job retries in its own task, sleeping
//! `backoff * 2^(attempt - 1)` between attempts, until it succeeds or runs
//! out of attempts. Exhausted jobs stay in the queue's failed set.
//!
//! Before every backoff sleep the worker pushes its lease past the sleep
//! plus one full lease, so a job never becomes visible to another worker
//! while it is still being retried. A single attempt must therefore finish
//! within `lease_duration`.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tracing::{error, info, warn};

use sf_shared::config::WorkerConfig;

use crate::domain::entities::NotificationJob;

use super::handler::{decode_job, MailJobHandler};
use super::queue::JobQueue;
use super::transport::MailTransport;

/// Shortest lease accepted from configuration; twice the default SMTP
/// command timeout
pub const MIN_LEASE: Duration = Duration::from_secs(120);

/// Tuning knobs for [`NotificationWorker`]
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub concurrency: usize,
    pub poll_interval: Duration,
    pub lease_duration: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            poll_interval: Duration::from_secs(1),
            lease_duration: Duration::from_secs(300),
        }
    }
}

impl From<&WorkerConfig> for WorkerSettings {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            lease_duration: Duration::from_secs(config.lease_seconds).max(MIN_LEASE),
        }
    }
}

/// Final result of processing one leased job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
    /// The job was abandoned by an operator between attempts
    Abandoned,
    /// The lease could not be extended, so the job is no longer ours
    LeaseLost,
}

pub struct NotificationWorker<Q: JobQueue, T: MailTransport> {
    queue: Arc<Q>,
    handler: Arc<MailJobHandler<T>>,
    settings: WorkerSettings,
}

impl<Q: JobQueue, T: MailTransport> Clone for NotificationWorker<Q, T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            handler: Arc::clone(&self.handler),
            settings: self.settings,
        }
    }
}

impl<Q: JobQueue, T: MailTransport> NotificationWorker<Q, T> {
    pub fn new(queue: Arc<Q>, handler: Arc<MailJobHandler<T>>, settings: WorkerSettings) -> Self {
        Self {
            queue,
            handler,
            settings,
        }
    }

    /// Poll the queue until `shutdown` flips to `true`, then wait for
    /// in-flight jobs to finish
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let concurrency = self.settings.concurrency.max(1);
        let permits = Arc::new(Semaphore::new(concurrency));
        info!(event = "worker_started", concurrency, "Notification worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let permit = tokio::select! {
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = shutdown.changed() => break,
            };

            match self.queue.lease(self.settings.lease_duration).await {
                Ok(Some(job)) => {
                    let worker = self.clone();
                    tokio::spawn(async move {
                        worker.process_job(job).await;
                        drop(permit);
                    });
                }
                Ok(None) => {
                    drop(permit);
                    tokio::select! {
                        _ = tokio::time::sleep(self.settings.poll_interval) => {}
                        _ = shutdown.changed() => break,
                    }
                }
                Err(e) => {
                    drop(permit);
                    error!(event = "queue_lease_failed", error = %e, "Failed to lease job");
                    tokio::time::sleep(self.settings.poll_interval).await;
                }
            }
        }

        // Every permit back means every spawned job has finished
        let _ = permits.acquire_many(concurrency as u32).await;
        info!(event = "worker_stopped", "Notification worker stopped");
    }

    /// Run a leased job to completion, retrying with exponential backoff
    pub async fn process_job(&self, job: NotificationJob) -> JobOutcome {
        let payload = match decode_job(&job) {
            Ok(payload) => payload,
            Err(e) => {
                error!(event = "job_undeliverable", job_id = %job.id, job = %job.name, error = %e, "Job cannot be processed");
                self.fail(&job, &e.to_string()).await;
                return JobOutcome::Failed;
            }
        };

        let max_attempts = job.options.max_attempts.max(1);
        let mut attempt = job.attempts_made;
        if attempt >= max_attempts {
            let reason = job
                .last_error
                .clone()
                .unwrap_or_else(|| "attempts exhausted".to_string());
            self.fail(&job, &reason).await;
            return JobOutcome::Failed;
        }

        loop {
            attempt += 1;
            match self.handler.execute(&payload).await {
                Ok(()) => {
                    if let Err(e) = self.queue.complete(job.id).await {
                        error!(event = "queue_complete_failed", job_id = %job.id, error = %e, "Failed to mark job complete");
                    }
                    info!(event = "job_completed", job_id = %job.id, job = %job.name, attempt, "Job completed");
                    return JobOutcome::Completed;
                }
                Err(e) => {
                    let message = e.to_string();
                    warn!(
                        event = "job_attempt_failed",
                        job_id = %job.id,
                        job = %job.name,
                        attempt,
                        max_attempts,
                        error = %message,
                        "Job attempt failed"
                    );

                    let still_active = match self.queue.record_failure(job.id, &message).await {
                        Ok(active) => active,
                        Err(e) => {
                            error!(event = "queue_record_failed", job_id = %job.id, error = %e, "Failed to record attempt");
                            true
                        }
                    };

                    if attempt >= max_attempts {
                        error!(
                            event = "job_exhausted",
                            job_id = %job.id,
                            job = %job.name,
                            attempts = attempt,
                            error = %message,
                            "Job failed after all attempts"
                        );
                        self.fail(&job, &message).await;
                        return JobOutcome::Failed;
                    }
                    if !still_active {
                        info!(event = "job_abandoned", job_id = %job.id, job = %job.name, "Job abandoned, not retrying");
                        return JobOutcome::Abandoned;
                    }

                    let delay = job.options.delay_after(attempt);
                    match self
                        .queue
                        .extend_lease(job.id, delay + self.settings.lease_duration)
                        .await
                    {
                        Ok(true) => {}
                        Ok(false) => {
                            warn!(event = "job_lease_lost", job_id = %job.id, job = %job.name, attempt, "Lease lost, not retrying");
                            return JobOutcome::LeaseLost;
                        }
                        Err(e) => {
                            error!(event = "queue_extend_failed", job_id = %job.id, error = %e, "Failed to extend lease");
                        }
                    }
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn fail(&self, job: &NotificationJob, reason: &str) {
        if let Err(e) = self.queue.fail(job.id, reason).await {
            error!(event = "queue_fail_failed", job_id = %job.id, error = %e, "Failed to move job to failed set");
        }
    }
}
