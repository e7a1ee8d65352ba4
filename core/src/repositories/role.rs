//! Role repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::Role;
use crate::errors::DomainError;

#[async_trait]
pub trait RoleRepository: Send {
    async fn find_role_by_id(&mut self, id: Uuid) -> Result<Option<Role>, DomainError>;

    async fn find_role_by_name(&mut self, name: &str) -> Result<Option<Role>, DomainError>;

    /// All roles, newest first
    async fn list_roles(&mut self) -> Result<Vec<Role>, DomainError>;

    /// Insert a role
    ///
    /// # Errors
    /// * `DomainError::Conflict` - A role with the same name exists
    async fn insert_role(&mut self, role: &Role) -> Result<(), DomainError>;

    /// Persist changes to a role
    ///
    /// # Errors
    /// * `DomainError::Conflict` - The new name is taken by another role
    /// * `DomainError::NotFound` - No role with this id
    async fn update_role(&mut self, role: &Role) -> Result<(), DomainError>;

    /// Delete a role. Returns `false` when it did not exist.
    async fn delete_role(&mut self, id: Uuid) -> Result<bool, DomainError>;
}
