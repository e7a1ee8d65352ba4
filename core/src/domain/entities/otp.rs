//! One-time password records used for email verification.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// What a one-time password is allowed to prove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    /// Proves control of the account email address
    Verification,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Verification => "verification",
        }
    }
}

impl FromStr for OtpPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verification" => Ok(OtpPurpose::Verification),
            other => Err(format!("Unknown OTP purpose: {}", other)),
        }
    }
}

/// Stored OTP record
///
/// Only the SHA-256 digest of the code is kept; the plaintext exists solely
/// in the email job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub id: Uuid,

    pub user_id: Uuid,

    pub purpose: OtpPurpose,

    /// Hex-encoded SHA-256 digest of the code
    pub code_hash: String,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Creates a record issued at `issued_at` and valid for `ttl`
    pub fn new(
        user_id: Uuid,
        purpose: OtpPurpose,
        code_hash: String,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            purpose,
            code_hash,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    /// A code is usable up to and including its expiry instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
