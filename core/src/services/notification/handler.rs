//! Per-job-type delivery strategies.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::entities::{job_names, JobPayload, NotificationJob};

use super::templates::{self, TemplateSettings};
use super::transport::{MailError, MailTransport};

/// Reasons a stored job cannot be turned into a typed payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No strategy registered for job type '{0}'")]
    NoStrategy(String),

    #[error("Malformed payload for job type '{name}': {reason}")]
    MalformedPayload { name: String, reason: String },
}

/// Decode a queued job into its typed payload
///
/// Unknown names are reported as [`DispatchError::NoStrategy`] so the worker
/// can fail them without retrying.
pub fn decode_job(job: &NotificationJob) -> Result<JobPayload, DispatchError> {
    if !job_names::ALL.contains(&job.name.as_str()) {
        return Err(DispatchError::NoStrategy(job.name.clone()));
    }

    let envelope = serde_json::json!({ "name": job.name, "data": job.data });
    serde_json::from_value(envelope).map_err(|e| DispatchError::MalformedPayload {
        name: job.name.clone(),
        reason: e.to_string(),
    })
}

/// Renders and sends each job type through a [`MailTransport`]
pub struct MailJobHandler<T: MailTransport> {
    transport: Arc<T>,
    settings: TemplateSettings,
}

impl<T: MailTransport> MailJobHandler<T> {
    pub fn new(transport: Arc<T>, settings: TemplateSettings) -> Self {
        Self { transport, settings }
    }

    /// Run one delivery attempt
    pub async fn execute(&self, payload: &JobPayload) -> Result<(), MailError> {
        let message = templates::render(payload, &self.settings);
        debug!(
            event = "mail_rendered",
            job = payload.name(),
            transport = self.transport.name(),
            "Rendered email"
        );

        self.transport.send(&message).await?;

        match payload {
            JobPayload::SendOtp(data) => {
                info!(event = "otp_email_sent", to = %data.to, "OTP email sent");
            }
            JobPayload::PasswordReset(data) => {
                info!(event = "password_reset_email_sent", to = %data.to, "Password reset email sent");
            }
            JobPayload::OrderConfirmation(data) => {
                info!(
                    event = "order_confirmation_email_sent",
                    to = %data.to,
                    order_id = %data.order.order_id,
                    "Order confirmation email sent"
                );
            }
        }
        Ok(())
    }
}
