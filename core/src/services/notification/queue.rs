//! Durable job queue abstraction and an in-memory implementation.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::entities::{JobHandle, JobState, NotificationJob};
use crate::errors::DomainError;

/// Queue collaborator used by the dispatcher and the worker
///
/// Implementations must guarantee that a leased job is handed to no other
/// caller until its lease expires or the job is completed, failed or
/// abandoned. Failed jobs are retained for inspection.
#[async_trait]
pub trait JobQueue: Send + Sync + 'static {
    /// Durably store a waiting job
    async fn enqueue(&self, job: NotificationJob) -> Result<JobHandle, DomainError>;

    /// Take the oldest waiting job and hide it from other workers for
    /// `lease_for`. Jobs whose lease ran out are waiting again.
    async fn lease(&self, lease_for: Duration) -> Result<Option<NotificationJob>, DomainError>;

    /// Push the lease deadline of an active job to `lease_for` from now
    ///
    /// Returns `false` when the job is no longer leased, so the holder must
    /// stop working on it.
    async fn extend_lease(&self, id: Uuid, lease_for: Duration) -> Result<bool, DomainError>;

    /// Record a failed attempt on an active job
    ///
    /// # Returns
    ///
    /// `false` when the job is no longer active (for example abandoned by an
    /// operator), in which case the caller should stop retrying.
    async fn record_failure(&self, id: Uuid, error: &str) -> Result<bool, DomainError>;

    /// Remove a successfully delivered job
    async fn complete(&self, id: Uuid) -> Result<(), DomainError>;

    /// Move a job to the failed set, where it is kept
    async fn fail(&self, id: Uuid, error: &str) -> Result<(), DomainError>;

    /// Jobs in the failed set, oldest failure first
    async fn failed_jobs(&self) -> Result<Vec<NotificationJob>, DomainError>;

    /// Operator action: stop a waiting or active job and move it to the
    /// failed set. Returns `false` if the job is unknown or already failed.
    async fn abandon(&self, id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: HashMap<Uuid, NotificationJob>,
    waiting: VecDeque<Uuid>,
    leases: HashMap<Uuid, Instant>,
}

impl QueueState {
    fn reclaim_expired_leases(&mut self, now: Instant) {
        let expired: Vec<Uuid> = self
            .leases
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            self.leases.remove(&id);
            if let Some(job) = self.jobs.get_mut(&id) {
                job.state = JobState::Waiting;
                self.waiting.push_back(id);
            }
        }
    }
}

/// Process-local queue
///
/// Not durable across restarts; used in tests and single-node development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobQueue {
    state: Arc<Mutex<QueueState>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every job that is not failed, in no particular order
    pub async fn pending_jobs(&self) -> Vec<NotificationJob> {
        self.state
            .lock()
            .await
            .jobs
            .values()
            .filter(|j| j.state != JobState::Failed)
            .cloned()
            .collect()
    }

    pub async fn job(&self, id: Uuid) -> Option<NotificationJob> {
        self.state.lock().await.jobs.get(&id).cloned()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, mut job: NotificationJob) -> Result<JobHandle, DomainError> {
        let mut state = self.state.lock().await;
        job.state = JobState::Waiting;
        let handle = JobHandle {
            id: job.id,
            name: job.name.clone(),
        };
        state.waiting.push_back(job.id);
        state.jobs.insert(job.id, job);
        Ok(handle)
    }

    async fn lease(&self, lease_for: Duration) -> Result<Option<NotificationJob>, DomainError> {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        state.reclaim_expired_leases(now);

        while let Some(id) = state.waiting.pop_front() {
            let Some(job) = state.jobs.get_mut(&id) else {
                continue;
            };
            if job.state != JobState::Waiting {
                continue;
            }
            job.state = JobState::Active;
            let leased = job.clone();
            state.leases.insert(id, now + lease_for);
            return Ok(Some(leased));
        }
        Ok(None)
    }

    async fn extend_lease(&self, id: Uuid, lease_for: Duration) -> Result<bool, DomainError> {
        let mut state = self.state.lock().await;
        let active = matches!(state.jobs.get(&id), Some(job) if job.state == JobState::Active);
        match state.leases.get_mut(&id) {
            Some(deadline) if active => {
                *deadline = Instant::now() + lease_for;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_failure(&self, id: Uuid, error: &str) -> Result<bool, DomainError> {
        let mut state = self.state.lock().await;
        match state.jobs.get_mut(&id) {
            Some(job) if job.state == JobState::Active => {
                job.attempts_made += 1;
                job.last_error = Some(error.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.leases.remove(&id);
        if matches!(state.jobs.get(&id), Some(job) if job.state != JobState::Failed) {
            state.jobs.remove(&id);
        }
        Ok(())
    }

    async fn fail(&self, id: Uuid, error: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.leases.remove(&id);
        state.waiting.retain(|w| *w != id);
        if let Some(job) = state.jobs.get_mut(&id) {
            if job.state != JobState::Failed {
                job.state = JobState::Failed;
                job.last_error = Some(error.to_string());
                job.failed_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn failed_jobs(&self) -> Result<Vec<NotificationJob>, DomainError> {
        let state = self.state.lock().await;
        let mut failed: Vec<NotificationJob> = state
            .jobs
            .values()
            .filter(|j| j.state == JobState::Failed)
            .cloned()
            .collect();
        failed.sort_by_key(|j| j.failed_at);
        Ok(failed)
    }

    async fn abandon(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.lock().await;
        let abandoned = match state.jobs.get_mut(&id) {
            Some(job) if job.state != JobState::Failed => {
                job.state = JobState::Failed;
                job.last_error = Some("abandoned by operator".to_string());
                job.failed_at = Some(Utc::now());
                true
            }
            _ => false,
        };
        if abandoned {
            state.leases.remove(&id);
            state.waiting.retain(|w| *w != id);
        }
        Ok(abandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{JobOptions, JobPayload, PasswordResetEmail};

    fn job() -> NotificationJob {
        NotificationJob::new(
            &JobPayload::PasswordReset(PasswordResetEmail {
                to: "a@example.com".to_string(),
                token: "tok".to_string(),
            }),
            JobOptions::account_email(),
        )
    }

    #[tokio::test]
    async fn test_leased_job_is_invisible_to_others() {
        let queue = InMemoryJobQueue::new();
        queue.enqueue(job()).await.unwrap();

        let first = queue.lease(Duration::from_secs(60)).await.unwrap();
        let second = queue.lease(Duration::from_secs(60)).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_lease_returns_job_to_waiting() {
        let queue = InMemoryJobQueue::new();
        let handle = queue.enqueue(job()).await.unwrap();

        queue.lease(Duration::from_secs(10)).await.unwrap().unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;

        let again = queue.lease(Duration::from_secs(10)).await.unwrap().unwrap();
        assert_eq!(again.id, handle.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_extended_lease_keeps_job_hidden() {
        let queue = InMemoryJobQueue::new();
        let handle = queue.enqueue(job()).await.unwrap();

        queue.lease(Duration::from_secs(10)).await.unwrap().unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;
        assert!(queue.extend_lease(handle.id, Duration::from_secs(10)).await.unwrap());
        tokio::time::advance(Duration::from_secs(8)).await;

        assert!(queue.lease(Duration::from_secs(10)).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_lease_cannot_be_extended() {
        let queue = InMemoryJobQueue::new();
        let handle = queue.enqueue(job()).await.unwrap();

        queue.lease(Duration::from_secs(10)).await.unwrap().unwrap();
        queue.fail(handle.id, "smtp down").await.unwrap();
        assert!(!queue.extend_lease(handle.id, Duration::from_secs(10)).await.unwrap());
        assert!(!queue.extend_lease(Uuid::new_v4(), Duration::from_secs(10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_complete_removes_and_fail_retains() {
        let queue = InMemoryJobQueue::new();
        let ok = queue.enqueue(job()).await.unwrap();
        let bad = queue.enqueue(job()).await.unwrap();

        queue.lease(Duration::from_secs(60)).await.unwrap();
        queue.lease(Duration::from_secs(60)).await.unwrap();
        queue.complete(ok.id).await.unwrap();
        queue.fail(bad.id, "smtp down").await.unwrap();

        assert!(queue.job(ok.id).await.is_none());
        let failed = queue.failed_jobs().await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, bad.id);
        assert_eq!(failed[0].last_error.as_deref(), Some("smtp down"));
    }

    #[tokio::test]
    async fn test_abandon_stops_retries() {
        let queue = InMemoryJobQueue::new();
        let handle = queue.enqueue(job()).await.unwrap();
        queue.lease(Duration::from_secs(60)).await.unwrap();

        assert!(queue.abandon(handle.id).await.unwrap());
        assert!(!queue.record_failure(handle.id, "late").await.unwrap());
        assert!(!queue.abandon(handle.id).await.unwrap());
        assert_eq!(queue.failed_jobs().await.unwrap().len(), 1);
    }
}
