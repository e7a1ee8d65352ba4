//! Mail transports: SMTP via lettre, and a logging fallback for
//! environments without a relay.

pub mod logging;
pub mod smtp;

use async_trait::async_trait;
use sf_core::services::notification::{EmailMessage, MailError, MailTransport};
use sf_shared::config::MailConfig;

pub use logging::LogMailTransport;
pub use smtp::SmtpMailTransport;

/// Transport selected from configuration at startup
pub enum MailBackend {
    Smtp(SmtpMailTransport),
    Log(LogMailTransport),
}

impl MailBackend {
    /// SMTP when a relay host is configured, logging otherwise
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        if config.is_configured() {
            Ok(MailBackend::Smtp(SmtpMailTransport::new(config)?))
        } else {
            tracing::warn!("SMTP_HOST not set; outgoing email will only be logged");
            Ok(MailBackend::Log(LogMailTransport::new()))
        }
    }
}

#[async_trait]
impl MailTransport for MailBackend {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        match self {
            MailBackend::Smtp(transport) => transport.send(message).await,
            MailBackend::Log(transport) => transport.send(message).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            MailBackend::Smtp(transport) => transport.name(),
            MailBackend::Log(transport) => transport.name(),
        }
    }
}
