//! Producer side of the notification pipeline.

use std::sync::Arc;
use tracing::info;

use crate::domain::entities::{
    JobHandle, JobOptions, JobPayload, NotificationJob, OrderConfirmationEmail, OrderSummary,
    OtpEmail, PasswordResetEmail,
};
use crate::errors::DomainResult;

use super::queue::JobQueue;

/// Enqueues typed email jobs
///
/// Enqueueing only writes to the queue; delivery happens in the
/// [`NotificationWorker`](super::NotificationWorker).
pub struct NotificationDispatcher<Q: JobQueue> {
    queue: Arc<Q>,
}

impl<Q: JobQueue> Clone for NotificationDispatcher<Q> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<Q: JobQueue> NotificationDispatcher<Q> {
    pub fn new(queue: Arc<Q>) -> Self {
        Self { queue }
    }

    pub fn queue(&self) -> &Arc<Q> {
        &self.queue
    }

    /// Enqueue an arbitrary payload with explicit options
    pub async fn enqueue(&self, payload: JobPayload, options: JobOptions) -> DomainResult<JobHandle> {
        let job = NotificationJob::new(&payload, options);
        let handle = self.queue.enqueue(job).await?;
        info!(
            event = "notification_enqueued",
            job_id = %handle.id,
            job = %handle.name,
            to = payload.recipient(),
            max_attempts = options.max_attempts,
            "Notification job enqueued"
        );
        Ok(handle)
    }

    pub async fn send_otp(&self, to: &str, otp: &str) -> DomainResult<JobHandle> {
        let payload = JobPayload::SendOtp(OtpEmail {
            to: to.to_string(),
            otp: otp.to_string(),
        });
        self.enqueue(payload, JobOptions::account_email()).await
    }

    pub async fn send_password_reset(&self, to: &str, token: &str) -> DomainResult<JobHandle> {
        let payload = JobPayload::PasswordReset(PasswordResetEmail {
            to: to.to_string(),
            token: token.to_string(),
        });
        self.enqueue(payload, JobOptions::account_email()).await
    }

    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order: OrderSummary,
    ) -> DomainResult<JobHandle> {
        let payload = JobPayload::OrderConfirmation(OrderConfirmationEmail {
            to: to.to_string(),
            order,
        });
        self.enqueue(payload, JobOptions::default()).await
    }
}
