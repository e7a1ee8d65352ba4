//! Unit tests for the notification worker
//!
//! Time is paused so backoff sleeps complete instantly while still being
//! measurable.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use sf_shared::config::WorkerConfig;

use crate::domain::entities::{JobOptions, NotificationJob};
use crate::services::notification::worker::MIN_LEASE;
use crate::services::notification::{
    InMemoryJobQueue, JobOutcome, JobQueue, MailJobHandler, NotificationDispatcher,
    NotificationWorker, TemplateSettings, WorkerSettings,
};

use super::mocks::RecordingTransport;

const LEASE: Duration = Duration::from_secs(600);

fn worker(
    queue: &Arc<InMemoryJobQueue>,
    transport: &Arc<RecordingTransport>,
    concurrency: usize,
) -> NotificationWorker<InMemoryJobQueue, RecordingTransport> {
    worker_with_lease(queue, transport, concurrency, LEASE)
}

fn worker_with_lease(
    queue: &Arc<InMemoryJobQueue>,
    transport: &Arc<RecordingTransport>,
    concurrency: usize,
    lease_duration: Duration,
) -> NotificationWorker<InMemoryJobQueue, RecordingTransport> {
    let handler = MailJobHandler::new(
        Arc::clone(transport),
        TemplateSettings::new("http://localhost:3000"),
    );
    NotificationWorker::new(
        Arc::clone(queue),
        Arc::new(handler),
        WorkerSettings {
            concurrency,
            poll_interval: Duration::from_millis(100),
            lease_duration,
        },
    )
}

#[tokio::test(start_paused = true)]
async fn test_retries_with_exponential_backoff_then_succeeds() {
    let queue = Arc::new(InMemoryJobQueue::new());
    let transport = Arc::new(RecordingTransport::failing_first(2));
    let dispatcher = NotificationDispatcher::new(Arc::clone(&queue));
    let handle = dispatcher.send_otp("a@example.com", "123456").await.unwrap();

    let job = queue.lease(LEASE).await.unwrap().unwrap();
    let outcome = worker(&queue, &transport, 1).process_job(job).await;

    assert_eq!(outcome, JobOutcome::Completed);
    assert_eq!(transport.attempts(), 3);
    assert_eq!(transport.sent_count(), 1);
    assert!(queue.job(handle.id).await.is_none());

    let times = transport.attempt_times.lock().unwrap().clone();
    let first_gap = times[1] - times[0];
    let second_gap = times[2] - times[1];
    assert!(first_gap >= Duration::from_millis(3000) && first_gap < Duration::from_millis(3100));
    assert!(second_gap >= Duration::from_millis(6000) && second_gap < Duration::from_millis(6100));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_job_is_retained_as_failed() {
    let queue = Arc::new(InMemoryJobQueue::new());
    let transport = Arc::new(RecordingTransport::always_failing());
    let job = NotificationJob::from_parts(
        "send-otp",
        json!({ "to": "a@example.com", "otp": "123456" }),
        JobOptions::default(),
    );
    let handle = queue.enqueue(job).await.unwrap();

    let leased = queue.lease(LEASE).await.unwrap().unwrap();
    let outcome = worker(&queue, &transport, 1).process_job(leased).await;

    assert_eq!(outcome, JobOutcome::Failed);
    assert_eq!(transport.attempts(), 3);

    let failed = queue.failed_jobs().await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, handle.id);
    assert_eq!(failed[0].attempts_made, 3);
    assert!(failed[0].last_error.as_deref().unwrap().contains("connection refused"));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_job_fails_without_attempts() {
    let queue = Arc::new(InMemoryJobQueue::new());
    let transport = Arc::new(RecordingTransport::new());
    queue
        .enqueue(NotificationJob::from_parts("send-sms", json!({}), JobOptions::default()))
        .await
        .unwrap();

    let leased = queue.lease(LEASE).await.unwrap().unwrap();
    let outcome = worker(&queue, &transport, 1).process_job(leased).await;

    assert_eq!(outcome, JobOutcome::Failed);
    assert_eq!(transport.attempts(), 0);
    let failed = queue.failed_jobs().await.unwrap();
    assert!(failed[0].last_error.as_deref().unwrap().contains("send-sms"));
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_job_stops_retrying() {
    let queue = Arc::new(InMemoryJobQueue::new());
    let transport = Arc::new(RecordingTransport::always_failing());
    let dispatcher = NotificationDispatcher::new(Arc::clone(&queue));
    let handle = dispatcher.send_otp("a@example.com", "123456").await.unwrap();

    let leased = queue.lease(LEASE).await.unwrap().unwrap();
    let worker = worker(&queue, &transport, 1);
    let task = tokio::spawn(async move { worker.process_job(leased).await });

    while transport.attempts() < 1 {
        tokio::task::yield_now().await;
    }
    assert!(queue.abandon(handle.id).await.unwrap());

    // The attempt already scheduled runs, then the worker notices
    assert_eq!(task.await.unwrap(), JobOutcome::Abandoned);
    assert_eq!(transport.attempts(), 2);
    assert_eq!(
        queue.failed_jobs().await.unwrap()[0].last_error.as_deref(),
        Some("abandoned by operator")
    );
}

#[tokio::test(start_paused = true)]
async fn test_run_bounds_concurrency_and_drains_on_shutdown() {
    let queue = Arc::new(InMemoryJobQueue::new());
    let transport = Arc::new(RecordingTransport::new().with_delay(Duration::from_secs(1)));
    let dispatcher = NotificationDispatcher::new(Arc::clone(&queue));
    for i in 0..5 {
        dispatcher
            .send_otp(&format!("user{i}@example.com"), "123456")
            .await
            .unwrap();
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let run = tokio::spawn(worker(&queue, &transport, 2).run(shutdown_rx));

    while transport.sent_count() < 5 {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    shutdown_tx.send(true).unwrap();
    run.await.unwrap();

    assert_eq!(transport.max_in_flight(), 2);
    assert!(queue.pending_jobs().await.is_empty());
    assert!(queue.failed_jobs().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_retries_outlasting_the_lease_stay_with_one_worker() {
    let queue = Arc::new(InMemoryJobQueue::new());
    let transport = Arc::new(RecordingTransport::always_failing());
    let dispatcher = NotificationDispatcher::new(Arc::clone(&queue));
    // 5 attempts with 3s, 6s, 12s and 24s of backoff: far longer than the lease
    let handle = dispatcher.send_otp("a@example.com", "123456").await.unwrap();

    let lease = Duration::from_secs(20);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let first = tokio::spawn(worker_with_lease(&queue, &transport, 1, lease).run(shutdown_rx.clone()));
    let second = tokio::spawn(worker_with_lease(&queue, &transport, 1, lease).run(shutdown_rx));

    tokio::time::sleep(Duration::from_secs(200)).await;
    shutdown_tx.send(true).unwrap();
    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(transport.attempts(), 5);
    assert_eq!(transport.max_in_flight(), 1);
    let failed = queue.failed_jobs().await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, handle.id);
    assert_eq!(failed[0].attempts_made, 5);
}

#[test]
fn test_configured_lease_has_a_floor() {
    let short = WorkerConfig {
        lease_seconds: 5,
        ..WorkerConfig::default()
    };
    assert_eq!(WorkerSettings::from(&short).lease_duration, MIN_LEASE);

    let long = WorkerConfig {
        lease_seconds: 900,
        ..WorkerConfig::default()
    };
    assert_eq!(WorkerSettings::from(&long).lease_duration, Duration::from_secs(900));
}
