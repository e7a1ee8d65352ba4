//! Configuration for the OTP ledger

use chrono::Duration;
use sf_shared::OtpConfig;

/// Configuration for the OTP ledger
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Number of digits in a generated code
    pub code_length: usize,
    /// How long a code stays valid after issue
    pub ttl: Duration,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            ttl: Duration::minutes(10),
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(config: &OtpConfig) -> Self {
        Self {
            code_length: config.length.clamp(4, 10),
            ttl: Duration::seconds(config.ttl_seconds),
        }
    }
}
