//! In-memory implementation of [`AuthStore`].
//!
//! Transactions are fully serialized: `begin` takes an owned lock over the
//! tables and works on a private copy that replaces the shared tables on
//! commit. Used by tests and by local development without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::entities::{OtpPurpose, OtpRecord, ResetToken, Role, User};
use crate::errors::DomainError;
use crate::repositories::{
    AuthStore, AuthTransaction, OtpRepository, ResetTokenRepository, RoleRepository, UserRepository,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    roles: HashMap<Uuid, Role>,
    otps: Vec<OtpRecord>,
    reset_tokens: Vec<ResetToken>,
}

/// Shared in-memory store
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed copy of a user
    pub async fn user(&self, id: Uuid) -> Option<User> {
        self.tables.lock().await.users.get(&id).cloned()
    }

    /// Committed copy of a user looked up by email
    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        self.tables
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    /// Committed OTP records of a user
    pub async fn otps_for(&self, user_id: Uuid) -> Vec<OtpRecord> {
        self.tables
            .lock()
            .await
            .otps
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Committed reset tokens of a user
    pub async fn reset_tokens_for(&self, user_id: Uuid) -> Vec<ResetToken> {
        self.tables
            .lock()
            .await
            .reset_tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuthStore for InMemoryAuthStore {
    async fn begin(&self) -> Result<Box<dyn AuthTransaction>, DomainError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, working }))
    }
}

/// Unit of work over an [`InMemoryAuthStore`]
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

#[async_trait]
impl AuthTransaction for InMemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let InMemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryTransaction {
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.working.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn lock_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        // The whole store is already held exclusively by this transaction
        self.find_user_by_id(id).await
    }

    async fn insert_user(&mut self, user: &User) -> Result<(), DomainError> {
        if self.working.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::conflict("Email already in use"));
        }
        self.working.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), DomainError> {
        match self.working.users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(DomainError::not_found(format!("user {}", user.id))),
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryTransaction {
    async fn find_role_by_id(&mut self, id: Uuid) -> Result<Option<Role>, DomainError> {
        Ok(self.working.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&mut self, name: &str) -> Result<Option<Role>, DomainError> {
        Ok(self.working.roles.values().find(|r| r.name == name).cloned())
    }

    async fn list_roles(&mut self) -> Result<Vec<Role>, DomainError> {
        let mut roles: Vec<Role> = self.working.roles.values().cloned().collect();
        roles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(roles)
    }

    async fn insert_role(&mut self, role: &Role) -> Result<(), DomainError> {
        if self.working.roles.values().any(|r| r.name == role.name) {
            return Err(DomainError::conflict(format!(
                "Role with name {} already exists",
                role.name
            )));
        }
        self.working.roles.insert(role.id, role.clone());
        Ok(())
    }

    async fn update_role(&mut self, role: &Role) -> Result<(), DomainError> {
        if self
            .working
            .roles
            .values()
            .any(|r| r.name == role.name && r.id != role.id)
        {
            return Err(DomainError::conflict(format!(
                "Role with name {} already exists",
                role.name
            )));
        }
        match self.working.roles.get_mut(&role.id) {
            Some(existing) => {
                *existing = role.clone();
                Ok(())
            }
            None => Err(DomainError::not_found(format!("role {}", role.id))),
        }
    }

    async fn delete_role(&mut self, id: Uuid) -> Result<bool, DomainError> {
        if self.working.roles.remove(&id).is_none() {
            return Ok(false);
        }
        // Holders keep their account but lose the role
        for user in self.working.users.values_mut() {
            if user.role_id == Some(id) {
                user.role_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl OtpRepository for InMemoryTransaction {
    async fn replace_otp(&mut self, record: &OtpRecord) -> Result<(), DomainError> {
        self.working
            .otps
            .retain(|o| !(o.user_id == record.user_id && o.purpose == record.purpose));
        self.working.otps.push(record.clone());
        Ok(())
    }

    async fn find_otp(
        &mut self,
        user_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, DomainError> {
        Ok(self
            .working
            .otps
            .iter()
            .find(|o| o.user_id == user_id && o.purpose == purpose)
            .cloned())
    }

    async fn delete_otps(&mut self, user_id: Uuid, purpose: OtpPurpose) -> Result<(), DomainError> {
        self.working
            .otps
            .retain(|o| !(o.user_id == user_id && o.purpose == purpose));
        Ok(())
    }
}

#[async_trait]
impl ResetTokenRepository for InMemoryTransaction {
    async fn latest_reset_token(&mut self, user_id: Uuid) -> Result<Option<ResetToken>, DomainError> {
        Ok(self
            .working
            .reset_tokens
            .iter()
            .filter(|t| t.user_id == user_id)
            .max_by_key(|t| t.created_at)
            .cloned())
    }

    async fn find_reset_token(&mut self, token: &str) -> Result<Option<ResetToken>, DomainError> {
        Ok(self
            .working
            .reset_tokens
            .iter()
            .find(|t| t.token == token)
            .cloned())
    }

    async fn replace_reset_token(&mut self, token: &ResetToken) -> Result<(), DomainError> {
        if self.working.reset_tokens.iter().any(|t| t.token == token.token) {
            return Err(DomainError::conflict("Reset token collision"));
        }
        self.working.reset_tokens.retain(|t| t.user_id != token.user_id);
        self.working.reset_tokens.push(token.clone());
        Ok(())
    }

    async fn delete_reset_tokens(&mut self, user_id: Uuid) -> Result<(), DomainError> {
        self.working.reset_tokens.retain(|t| t.user_id != user_id);
        Ok(())
    }
}
