//! Outbound mail and notification worker configuration

use serde::{Deserialize, Serialize};

/// SMTP transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    /// SMTP relay host; empty means the transport is not configured
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// SMTP username
    #[serde(default)]
    pub smtp_username: String,

    /// SMTP password
    #[serde(default)]
    pub smtp_password: String,

    /// Sender address used for every outgoing message
    pub from_address: String,

    /// Public base URL of the storefront, used to build links in emails
    pub app_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: String::from("noreply@storefront.local"),
            app_url: String::from("http://localhost:3000"),
        }
    }
}

impl MailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            smtp_host: std::env::var("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.smtp_port),
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or(defaults.smtp_username),
            smtp_password: std::env::var("SMTP_PASSWORD").unwrap_or(defaults.smtp_password),
            from_address: std::env::var("MAIL_FROM").unwrap_or(defaults.from_address),
            app_url: std::env::var("APP_URL").unwrap_or(defaults.app_url),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.smtp_host.trim().is_empty()
    }
}

/// Notification worker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    /// Maximum number of jobs processed in parallel
    pub concurrency: usize,

    /// Delay between queue polls when the queue is empty, in milliseconds
    pub poll_interval_ms: u64,

    /// How long a leased job stays invisible to other workers, in seconds
    pub lease_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            poll_interval_ms: 1000,
            lease_seconds: 300,
        }
    }
}

impl WorkerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            concurrency: std::env::var("MAIL_WORKER_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.concurrency),
            poll_interval_ms: std::env::var("MAIL_WORKER_POLL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_interval_ms),
            lease_seconds: std::env::var("MAIL_WORKER_LEASE_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lease_seconds),
        }
    }
}
