//! Outbound mail transport abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// A rendered email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Errors raised by a mail transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("Mail transport is not configured: {0}")]
    Configuration(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),

    #[error("Mail server connection error: {0}")]
    Connection(String),
}

/// Delivers rendered messages (SMTP in production, recorders in tests)
#[async_trait]
pub trait MailTransport: Send + Sync + 'static {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;

    /// Name used in logs
    fn name(&self) -> &str;
}
