//! Notification jobs: typed email payloads and their queue envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Wire names of the supported job types
pub mod job_names {
    pub const SEND_OTP: &str = "send-otp";
    pub const PASSWORD_RESET: &str = "password-reset";
    pub const ORDER_CONFIRMATION: &str = "order-confirmation";

    pub const ALL: [&str; 3] = [SEND_OTP, PASSWORD_RESET, ORDER_CONFIRMATION];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtpEmail {
    pub to: String,
    pub otp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordResetEmail {
    pub to: String,
    pub token: String,
}

/// One line of an order; amounts are in major currency units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: String,
    pub total: f64,
    pub items: Vec<OrderLine>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmationEmail {
    pub to: String,
    pub order: OrderSummary,
}

/// Closed set of job payloads, serialized as `{"name": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "kebab-case")]
pub enum JobPayload {
    SendOtp(OtpEmail),
    PasswordReset(PasswordResetEmail),
    OrderConfirmation(OrderConfirmationEmail),
}

impl JobPayload {
    /// Wire name of the job type
    pub fn name(&self) -> &'static str {
        match self {
            JobPayload::SendOtp(_) => job_names::SEND_OTP,
            JobPayload::PasswordReset(_) => job_names::PASSWORD_RESET,
            JobPayload::OrderConfirmation(_) => job_names::ORDER_CONFIRMATION,
        }
    }

    /// Destination address
    pub fn recipient(&self) -> &str {
        match self {
            JobPayload::SendOtp(data) => &data.to,
            JobPayload::PasswordReset(data) => &data.to,
            JobPayload::OrderConfirmation(data) => &data.to,
        }
    }

    /// The `data` half of the wire form
    pub fn data(&self) -> serde_json::Value {
        let result = match self {
            JobPayload::SendOtp(data) => serde_json::to_value(data),
            JobPayload::PasswordReset(data) => serde_json::to_value(data),
            JobPayload::OrderConfirmation(data) => serde_json::to_value(data),
        };
        // Plain structs of strings and numbers always serialize
        result.unwrap_or(serde_json::Value::Null)
    }
}

/// Delivery policy for one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    /// Total number of delivery attempts, including the first
    pub max_attempts: u32,

    /// Delay after the first failed attempt, in milliseconds; doubles after
    /// each further failure
    pub backoff_ms: u64,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 5000,
        }
    }
}

impl JobOptions {
    /// Policy for account emails (OTP, password reset)
    pub fn account_email() -> Self {
        Self {
            max_attempts: 5,
            backoff_ms: 3000,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let factor = 1u64 << exponent;
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

/// Lifecycle state of a queued job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Active,
    Failed,
}

/// Queue envelope around a job
///
/// The payload is kept in wire form (`name` + `data`) so that jobs written
/// by other producers, including unknown job types, can be stored and
/// surfaced instead of being lost at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub id: Uuid,
    pub name: String,
    pub data: serde_json::Value,
    pub options: JobOptions,
    pub attempts_made: u32,
    pub state: JobState,
    pub queued_at: DateTime<Utc>,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub failed_at: Option<DateTime<Utc>>,
}

impl NotificationJob {
    pub fn new(payload: &JobPayload, options: JobOptions) -> Self {
        Self::from_parts(payload.name(), payload.data(), options)
    }

    /// Builds a job from its wire parts without checking the name
    pub fn from_parts(name: impl Into<String>, data: serde_json::Value, options: JobOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            data,
            options,
            attempts_made: 0,
            state: JobState::Waiting,
            queued_at: Utc::now(),
            last_error: None,
            failed_at: None,
        }
    }
}

/// Reference to an enqueued job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: Uuid,
    pub name: String,
}
