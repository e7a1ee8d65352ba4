//! Single-use password reset tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Password reset token entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetToken {
    pub id: Uuid,

    pub user_id: Uuid,

    /// Opaque URL-safe token value, unique across all tokens
    pub token: String,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn new(user_id: Uuid, token: String, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the token was created less than `window` before `now`
    pub fn created_within(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at < window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_within_window() {
        let created = Utc::now();
        let token = ResetToken::new(Uuid::new_v4(), "t".repeat(64), created, Duration::hours(1));

        assert!(token.created_within(Duration::minutes(5), created + Duration::minutes(4)));
        assert!(!token.created_within(Duration::minutes(5), created + Duration::minutes(5)));
        assert!(!token.is_expired_at(created + Duration::minutes(59)));
        assert!(token.is_expired_at(created + Duration::minutes(61)));
    }
}
