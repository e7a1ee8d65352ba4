//! Transactional access to authentication state.
//!
//! Every operation that reads and then writes authentication state runs in
//! one [`AuthTransaction`]. Dropping a transaction without calling
//! [`AuthTransaction::commit`] rolls it back, so an early return through `?`
//! never leaves partial writes behind.

use async_trait::async_trait;

use super::{OtpRepository, ResetTokenRepository, RoleRepository, UserRepository};
use crate::errors::DomainError;

/// A unit of work over users, roles, OTPs and reset tokens
#[async_trait]
pub trait AuthTransaction:
    UserRepository + RoleRepository + OtpRepository + ResetTokenRepository + Send
{
    /// Make every change issued through this transaction visible atomically
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}

/// Factory for transactions
#[async_trait]
pub trait AuthStore: Send + Sync + 'static {
    async fn begin(&self) -> Result<Box<dyn AuthTransaction>, DomainError>;
}
