//! Reset token issue, rate limiting and lookup

use chrono::{Duration, Utc};
use rand::{rngs::OsRng, Rng};
use sf_shared::ResetConfig;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::entities::ResetToken;
use crate::errors::{AuthError, DomainResult};
use crate::repositories::{ResetTokenRepository, UserRepository};

/// Length of a generated reset token
pub const RESET_TOKEN_LENGTH: usize = 64;

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Configuration for the reset token ledger
#[derive(Debug, Clone)]
pub struct ResetServiceConfig {
    /// Token lifetime
    pub ttl: Duration,
    /// Minimum spacing between two issued tokens for one user
    pub rate_limit_window: Duration,
}

impl Default for ResetServiceConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(1),
            rate_limit_window: Duration::minutes(5),
        }
    }
}

impl From<&ResetConfig> for ResetServiceConfig {
    fn from(config: &ResetConfig) -> Self {
        Self {
            ttl: Duration::seconds(config.ttl_seconds),
            rate_limit_window: Duration::seconds(config.rate_limit_seconds),
        }
    }
}

/// Issues and resolves single-use password reset tokens
#[derive(Debug, Clone)]
pub struct ResetTokenService {
    config: ResetServiceConfig,
}

impl ResetTokenService {
    pub fn new(config: ResetServiceConfig) -> Self {
        Self { config }
    }

    /// Generate an opaque URL-safe token from the OS RNG
    pub fn generate_token(&self) -> String {
        let mut rng = OsRng;
        (0..RESET_TOKEN_LENGTH)
            .map(|_| char::from(TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())]))
            .collect()
    }

    /// Issue a token for `user_id` unless one was issued within the rate
    /// limit window
    ///
    /// The user row is locked first, so two concurrent requests for the same
    /// account cannot both pass the window check.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(token))` - A new token replaced any previous one
    /// * `Ok(None)` - Rate limited, or the user vanished; nothing changed
    pub async fn issue_if_allowed<R>(&self, repo: &mut R, user_id: Uuid) -> DomainResult<Option<String>>
    where
        R: UserRepository + ResetTokenRepository + ?Sized,
    {
        if repo.lock_user(user_id).await?.is_none() {
            return Ok(None);
        }

        let now = Utc::now();
        if let Some(latest) = repo.latest_reset_token(user_id).await? {
            if !latest.is_expired_at(now) && latest.created_within(self.config.rate_limit_window, now) {
                warn!(event = "reset_rate_limited", user_id = %user_id, "Password reset rate limit hit");
                return Ok(None);
            }
        }

        let token = ResetToken::new(user_id, self.generate_token(), now, self.config.ttl);
        repo.replace_reset_token(&token).await?;
        debug!(event = "reset_token_issued", user_id = %user_id, expires_at = %token.expires_at);
        Ok(Some(token.token))
    }

    /// Resolve an unexpired token
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidResetToken` - Unknown or expired token
    pub async fn find_valid<R>(&self, repo: &mut R, token: &str) -> DomainResult<ResetToken>
    where
        R: ResetTokenRepository + ?Sized,
    {
        match repo.find_reset_token(token).await? {
            Some(record) if !record.is_expired_at(Utc::now()) => Ok(record),
            _ => Err(AuthError::InvalidResetToken.into()),
        }
    }
}
