//! SMTP transport using lettre's async Tokio executor.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use sf_core::services::notification::{EmailMessage, MailError, MailTransport};
use sf_shared::config::MailConfig;

/// Sends HTML email through a STARTTLS relay
pub struct SmtpMailTransport {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Build the relay client. No connection is made until the first send.
    ///
    /// # Errors
    /// * `MailError::Configuration` - Bad relay host or sender address
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let from = parse_sender(&config.from_address)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Configuration(format!("Failed to create SMTP relay: {}", e)))?
            .port(config.smtp_port);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP transport configured");
        Ok(Self {
            from,
            transport: builder.build(),
        })
    }

    /// Open and close a connection to the relay
    pub async fn test_connection(&self) -> Result<(), MailError> {
        self.transport
            .test_connection()
            .await
            .map_err(|e| MailError::Connection(format!("SMTP connection test failed: {}", e)))?;
        Ok(())
    }

    fn build(&self, message: &EmailMessage) -> Result<Message, MailError> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| MailError::InvalidRecipient(format!("{}: {}", message.to, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .map_err(|e| MailError::SendFailed(format!("Failed to build message: {}", e)))
    }
}

fn parse_sender(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|e| MailError::Configuration(format!("Invalid from address: {}", e)))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let email = self.build(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::SendFailed(e.to_string()))?;

        tracing::debug!(to = %message.to, subject = %message.subject, "Email handed to SMTP relay");
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
