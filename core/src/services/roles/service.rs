//! Role CRUD over the transactional store

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use sf_shared::validation::length_between;

use crate::domain::entities::{Permission, Role};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::AuthStore;

pub const ROLE_NAME_MIN: usize = 3;
pub const ROLE_NAME_MAX: usize = 50;

/// Partial update of a role; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct RoleUpdate {
    pub name: Option<String>,
    pub permissions: Option<Vec<Permission>>,
}

pub struct RoleService<S: AuthStore> {
    store: Arc<S>,
}

impl<S: AuthStore> RoleService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All roles, newest first
    pub async fn list_roles(&self) -> DomainResult<Vec<Role>> {
        let mut tx = self.store.begin().await?;
        let roles = tx.list_roles().await?;
        Ok(roles)
    }

    pub async fn get_role(&self, id: Uuid) -> DomainResult<Role> {
        let mut tx = self.store.begin().await?;
        let role = tx.find_role_by_id(id).await?;
        role.ok_or_else(|| role_not_found(id))
    }

    /// Create a role
    ///
    /// # Errors
    ///
    /// * `DomainError::Conflict` - A role with this name exists
    /// * `DomainError::Validation` - Bad name length or a resource listed twice
    pub async fn create_role(&self, name: &str, permissions: Vec<Permission>) -> DomainResult<Role> {
        let name = validate_name(name)?;
        let role = Role::new(name, permissions)?;

        let mut tx = self.store.begin().await?;
        if tx.find_role_by_name(&role.name).await?.is_some() {
            return Err(name_taken(&role.name));
        }
        tx.insert_role(&role).await?;
        tx.commit().await?;

        info!(event = "role_created", role_id = %role.id, role = %role.name, "Role created");
        Ok(role)
    }

    /// Rename a role and/or replace its permissions
    ///
    /// The `super_admin` role cannot be renamed.
    pub async fn update_role(&self, id: Uuid, update: RoleUpdate) -> DomainResult<Role> {
        let mut tx = self.store.begin().await?;
        let mut role = tx
            .find_role_by_id(id)
            .await?
            .ok_or_else(|| role_not_found(id))?;

        if let Some(name) = update.name.as_deref() {
            let name = validate_name(name)?;
            if name != role.name {
                if role.is_super_admin() {
                    return Err(DomainError::forbidden("The super_admin role cannot be renamed"));
                }
                if tx.find_role_by_name(&name).await?.is_some() {
                    return Err(name_taken(&name));
                }
                role.rename(name);
            }
        }
        if let Some(permissions) = update.permissions {
            role.replace_permissions(permissions)?;
        }

        tx.update_role(&role).await?;
        tx.commit().await?;

        info!(event = "role_updated", role_id = %role.id, role = %role.name, "Role updated");
        Ok(role)
    }

    /// Delete a role; `super_admin` is never deleted
    pub async fn delete_role(&self, id: Uuid) -> DomainResult<()> {
        let mut tx = self.store.begin().await?;
        let role = tx
            .find_role_by_id(id)
            .await?
            .ok_or_else(|| role_not_found(id))?;

        if role.is_super_admin() {
            return Err(DomainError::forbidden("The super_admin role cannot be deleted"));
        }

        tx.delete_role(id).await?;
        tx.commit().await?;

        info!(event = "role_deleted", role_id = %id, role = %role.name, "Role deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    if !length_between(name, ROLE_NAME_MIN, ROLE_NAME_MAX) {
        return Err(ValidationError::InvalidLength {
            field: "name".to_string(),
            min: ROLE_NAME_MIN,
            max: ROLE_NAME_MAX,
        }
        .into());
    }
    Ok(name.trim().to_string())
}

fn role_not_found(id: Uuid) -> DomainError {
    DomainError::not_found(format!("Role with ID {}", id))
}

fn name_taken(name: &str) -> DomainError {
    DomainError::conflict(format!("Role with name {} already exists", name))
}
