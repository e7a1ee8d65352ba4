//! Redis implementation of [`JobQueue`]
//!
//! Jobs survive process restarts. Every state transition runs as a single
//! Lua script, so a job leased by one worker is invisible to the others
//! until its lease deadline passes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::MultiplexedConnection, Client};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use sf_core::domain::entities::{JobHandle, JobState, NotificationJob};
use sf_core::errors::DomainError;
use sf_core::services::notification::JobQueue;
use sf_shared::config::CacheConfig;

use super::scripts::QueueScripts;
use crate::InfrastructureError;

/// Name of the single queue used for outgoing email
pub const EMAIL_QUEUE: &str = "email";

const ABANDONED_MESSAGE: &str = "abandoned by operator";

/// Redis key layout of one queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueueKeys {
    waiting: String,
    active: String,
    failed: String,
    job_prefix: String,
}

impl QueueKeys {
    pub(crate) fn new(config: &CacheConfig, queue: &str) -> Self {
        Self {
            waiting: config.make_key(&format!("{}:waiting", queue)),
            active: config.make_key(&format!("{}:active", queue)),
            failed: config.make_key(&format!("{}:failed", queue)),
            job_prefix: config.make_key(&format!("{}:job:", queue)),
        }
    }

    pub(crate) fn job(&self, id: Uuid) -> String {
        format!("{}{}", self.job_prefix, id)
    }
}

/// Number of jobs in each queue structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueCounts {
    pub waiting: u64,
    pub active: u64,
    pub failed: u64,
}

/// Durable job queue stored in Redis
#[derive(Clone)]
pub struct RedisJobQueue {
    connection: MultiplexedConnection,
    keys: QueueKeys,
    scripts: Arc<QueueScripts>,
}

impl RedisJobQueue {
    /// Connect to Redis with the default retry policy (3 attempts, 100ms
    /// initial delay)
    pub async fn connect(config: &CacheConfig) -> Result<Self, InfrastructureError> {
        Self::connect_with_retry(config, 3, 100).await
    }

    /// Connect to Redis, retrying with exponential backoff capped at 5s
    pub async fn connect_with_retry(
        config: &CacheConfig,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, InfrastructureError> {
        info!(url = %mask_url(&config.url), "Connecting job queue to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let mut attempts = 0;
        let mut delay = retry_delay_ms;
        let connection = loop {
            attempts += 1;
            match client.get_multiplexed_async_connection().await {
                Ok(connection) => break connection,
                Err(e) if attempts < max_retries => {
                    warn!(
                        attempt = attempts,
                        max_retries,
                        error = %e,
                        "Failed to connect to Redis, retrying in {}ms",
                        delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(attempts, error = %e, "Failed to connect to Redis");
                    return Err(InfrastructureError::Queue(e));
                }
            }
        };

        info!(queue = EMAIL_QUEUE, "Job queue connected");
        Ok(Self {
            connection,
            keys: QueueKeys::new(config, EMAIL_QUEUE),
            scripts: Arc::new(QueueScripts::new()),
        })
    }

    /// Check if Redis answers
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let mut conn = self.connection.clone();
        let response: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(response == "PONG")
    }

    /// Sizes of the waiting list and the active and failed sets
    pub async fn counts(&self) -> Result<QueueCounts, InfrastructureError> {
        let mut conn = self.connection.clone();
        let (waiting, active, failed): (u64, u64, u64) = redis::pipe()
            .cmd("LLEN")
            .arg(&self.keys.waiting)
            .cmd("ZCARD")
            .arg(&self.keys.active)
            .cmd("ZCARD")
            .arg(&self.keys.failed)
            .query_async(&mut conn)
            .await?;
        Ok(QueueCounts {
            waiting,
            active,
            failed,
        })
    }

    /// Load a job by id, whatever its state
    pub async fn job(&self, id: Uuid) -> Result<Option<NotificationJob>, InfrastructureError> {
        let mut conn = self.connection.clone();
        let fields: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(self.keys.job(id))
            .query_async(&mut conn)
            .await?;
        decode_job(fields)
    }

    async fn push(&self, job: &NotificationJob) -> Result<(), InfrastructureError> {
        let envelope = serde_json::to_string(job)?;
        let mut conn = self.connection.clone();
        redis::pipe()
            .atomic()
            .cmd("HSET")
            .arg(self.keys.job(job.id))
            .arg("job")
            .arg(envelope)
            .arg("state")
            .arg(state_name(JobState::Waiting))
            .arg("attempts_made")
            .arg(job.attempts_made)
            .ignore()
            .cmd("RPUSH")
            .arg(&self.keys.waiting)
            .arg(job.id.to_string())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn take(&self, lease_for: Duration) -> Result<Option<NotificationJob>, InfrastructureError> {
        let now = Utc::now().timestamp_millis();
        let deadline = lease_deadline(now, lease_for);

        let mut conn = self.connection.clone();
        let leased: Option<String> = self
            .scripts
            .lease
            .key(&self.keys.waiting)
            .key(&self.keys.active)
            .arg(now)
            .arg(deadline)
            .arg(&self.keys.job_prefix)
            .invoke_async(&mut conn)
            .await?;

        let Some(raw_id) = leased else {
            return Ok(None);
        };
        let id = Uuid::parse_str(&raw_id)
            .map_err(|e| InfrastructureError::CorruptRecord(format!("job id {}: {}", raw_id, e)))?;
        debug!(job_id = %id, "Leased job");
        self.job(id).await
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<bool, InfrastructureError> {
        let now = Utc::now();
        let mut conn = self.connection.clone();
        let moved: i32 = self
            .scripts
            .fail
            .key(&self.keys.active)
            .key(&self.keys.waiting)
            .key(&self.keys.failed)
            .key(self.keys.job(id))
            .arg(id.to_string())
            .arg(reason)
            .arg(now.timestamp_millis())
            .arg(now.to_rfc3339())
            .invoke_async(&mut conn)
            .await?;
        Ok(moved == 1)
    }

    async fn failed(&self) -> Result<Vec<NotificationJob>, InfrastructureError> {
        let mut conn = self.connection.clone();
        let ids: Vec<String> = redis::cmd("ZRANGE")
            .arg(&self.keys.failed)
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await?;

        let mut jobs = Vec::with_capacity(ids.len());
        for raw_id in ids {
            let Ok(id) = Uuid::parse_str(&raw_id) else {
                warn!(job_id = %raw_id, "Skipping malformed id in failed set");
                continue;
            };
            if let Some(job) = self.job(id).await? {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, mut job: NotificationJob) -> Result<JobHandle, DomainError> {
        job.state = JobState::Waiting;
        self.push(&job).await?;
        Ok(JobHandle {
            id: job.id,
            name: job.name,
        })
    }

    async fn lease(&self, lease_for: Duration) -> Result<Option<NotificationJob>, DomainError> {
        Ok(self.take(lease_for).await?)
    }

    async fn extend_lease(&self, id: Uuid, lease_for: Duration) -> Result<bool, DomainError> {
        let deadline = lease_deadline(Utc::now().timestamp_millis(), lease_for);
        let mut conn = self.connection.clone();
        let extended: i32 = self
            .scripts
            .extend_lease
            .key(&self.keys.active)
            .key(self.keys.job(id))
            .arg(id.to_string())
            .arg(deadline)
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(extended == 1)
    }

    async fn record_failure(&self, id: Uuid, error: &str) -> Result<bool, DomainError> {
        let mut conn = self.connection.clone();
        let recorded: i32 = self
            .scripts
            .record_failure
            .key(&self.keys.active)
            .key(self.keys.job(id))
            .arg(id.to_string())
            .arg(error)
            .invoke_async(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(recorded == 1)
    }

    async fn complete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();
        self.scripts
            .complete
            .key(&self.keys.active)
            .key(&self.keys.waiting)
            .key(self.keys.job(id))
            .arg(id.to_string())
            .invoke_async::<_, i32>(&mut conn)
            .await
            .map_err(InfrastructureError::from)?;
        Ok(())
    }

    async fn fail(&self, id: Uuid, error: &str) -> Result<(), DomainError> {
        self.mark_failed(id, error).await?;
        Ok(())
    }

    async fn failed_jobs(&self) -> Result<Vec<NotificationJob>, DomainError> {
        Ok(self.failed().await?)
    }

    async fn abandon(&self, id: Uuid) -> Result<bool, DomainError> {
        let abandoned = self.mark_failed(id, ABANDONED_MESSAGE).await?;
        if abandoned {
            info!(event = "job_abandoned", job_id = %id, "Job abandoned by operator");
        }
        Ok(abandoned)
    }
}

fn lease_deadline(now_ms: i64, lease_for: Duration) -> i64 {
    now_ms.saturating_add(i64::try_from(lease_for.as_millis()).unwrap_or(i64::MAX / 2))
}

fn state_name(state: JobState) -> &'static str {
    match state {
        JobState::Waiting => "waiting",
        JobState::Active => "active",
        JobState::Failed => "failed",
    }
}

fn parse_state(raw: &str) -> Result<JobState, InfrastructureError> {
    match raw {
        "waiting" => Ok(JobState::Waiting),
        "active" => Ok(JobState::Active),
        "failed" => Ok(JobState::Failed),
        other => Err(InfrastructureError::CorruptRecord(format!("job state {}", other))),
    }
}

/// Rebuild a job from its hash. An empty hash means the job does not exist.
pub(crate) fn decode_job(
    mut fields: HashMap<String, String>,
) -> Result<Option<NotificationJob>, InfrastructureError> {
    let Some(envelope) = fields.remove("job") else {
        return Ok(None);
    };
    let mut job: NotificationJob = serde_json::from_str(&envelope)?;

    if let Some(state) = fields.get("state") {
        job.state = parse_state(state)?;
    }
    if let Some(attempts) = fields.get("attempts_made") {
        job.attempts_made = attempts
            .parse()
            .map_err(|_| InfrastructureError::CorruptRecord(format!("attempts_made {}", attempts)))?;
    }
    if let Some(last_error) = fields.remove("last_error") {
        job.last_error = Some(last_error);
    }
    if let Some(failed_at) = fields.get("failed_at") {
        let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(failed_at)
            .map_err(|e| InfrastructureError::CorruptRecord(format!("failed_at {}: {}", failed_at, e)))?
            .with_timezone(&Utc);
        job.failed_at = Some(parsed);
    }
    Ok(Some(job))
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let (Some(at_pos), Some(proto_end)) = (url.find('@'), url.find("://")) {
        if at_pos > proto_end {
            return format!("{}****{}", &url[..proto_end + 3], &url[at_pos..]);
        }
    }
    url.to_string()
}
