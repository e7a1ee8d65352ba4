//! User repository trait defining the interface for user persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::User;
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// Methods take `&mut self` because every implementation is a unit of work
/// (see [`AuthTransaction`](super::AuthTransaction)); reads and writes issued
/// through the same value observe each other and commit together.
#[async_trait]
pub trait UserRepository: Send {
    /// Find a user by normalized email
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user registered with this email
    /// * `Err(DomainError)` - Storage failure
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by their unique identifier
    async fn find_user_by_id(&mut self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user and hold an exclusive lock on the row until the unit of
    /// work ends. Concurrent callers locking the same user serialize.
    async fn lock_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Insert a new user
    ///
    /// # Errors
    /// * `DomainError::Conflict` - The email is already registered
    async fn insert_user(&mut self, user: &User) -> Result<(), DomainError>;

    /// Persist changes to an existing user
    ///
    /// # Errors
    /// * `DomainError::NotFound` - No user with this id
    async fn update_user(&mut self, user: &User) -> Result<(), DomainError>;
}
