//! Transport that writes messages to the log instead of sending them.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use sf_core::services::notification::{EmailMessage, MailError, MailTransport};

#[derive(Debug, Default)]
pub struct LogMailTransport {
    sent: AtomicU64,
}

impl LogMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged so far
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.html_body.len(),
            "[LOG] Email would be sent"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
