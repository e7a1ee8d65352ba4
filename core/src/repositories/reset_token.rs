//! Password reset token repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::ResetToken;
use crate::errors::DomainError;

#[async_trait]
pub trait ResetTokenRepository: Send {
    /// The most recently created token for a user, expired or not
    async fn latest_reset_token(&mut self, user_id: Uuid) -> Result<Option<ResetToken>, DomainError>;

    /// Look a token up by its opaque value
    async fn find_reset_token(&mut self, token: &str) -> Result<Option<ResetToken>, DomainError>;

    /// Store `token` as the only token of its user, removing older ones
    async fn replace_reset_token(&mut self, token: &ResetToken) -> Result<(), DomainError>;

    /// Remove every token of a user
    async fn delete_reset_tokens(&mut self, user_id: Uuid) -> Result<(), DomainError>;
}
