use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::{Action, Permission, Resource, Role};
use crate::domain::value_objects::Principal;
use crate::errors::{DomainError, DomainResult};
use crate::repositories::AuthStore;

/// Why a request was denied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The role has no entry for the required resource
    MissingResource { resource: Resource },

    /// The role has the resource but not every required action
    MissingActions { resource: Resource, actions: Vec<Action> },

    /// The user or their role could not be resolved
    AccessDenied,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::MissingResource { .. } => {
                write!(f, "User does not have required resource permission")
            }
            DenyReason::MissingActions { actions, .. } => {
                let names: Vec<&str> = actions.iter().map(Action::as_str).collect();
                write!(f, "User missing required actions: {}", names.join(", "))
            }
            DenyReason::AccessDenied => write!(f, "Access denied"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Decides whether a principal's role grants a set of permissions
pub struct PermissionEvaluator<S: AuthStore> {
    store: Arc<S>,
}

impl<S: AuthStore> PermissionEvaluator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Evaluate `required` against the principal's role
    ///
    /// Every entry must be satisfied. Entries are checked in order and the
    /// first failing one decides the denial.
    ///
    /// # Errors
    ///
    /// `DomainError::Unauthorized` when there is no principal. Lookup
    /// failures are not errors; they deny with [`DenyReason::AccessDenied`].
    pub async fn authorize(
        &self,
        principal: Option<&Principal>,
        required: &[Permission],
    ) -> DomainResult<AccessDecision> {
        let principal = principal.ok_or(DomainError::Unauthorized)?;
        if required.is_empty() {
            return Ok(AccessDecision::Allow);
        }

        let role = match self.resolve_role(principal).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                warn!(event = "authorization_denied", user_id = %principal.user_id, "User or role not found");
                return Ok(AccessDecision::Deny(DenyReason::AccessDenied));
            }
            Err(e) => {
                warn!(event = "authorization_denied", user_id = %principal.user_id, error = %e, "Permission lookup failed");
                return Ok(AccessDecision::Deny(DenyReason::AccessDenied));
            }
        };

        let decision = evaluate(&role, required);
        if let AccessDecision::Deny(reason) = &decision {
            debug!(
                event = "authorization_denied",
                user_id = %principal.user_id,
                role = %role.name,
                reason = %reason,
                "Permission check failed"
            );
        }
        Ok(decision)
    }

    /// Like [`authorize`](Self::authorize), but a denial becomes
    /// `DomainError::Forbidden` carrying the denial message
    pub async fn enforce(&self, principal: Option<&Principal>, required: &[Permission]) -> DomainResult<()> {
        match self.authorize(principal, required).await? {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny(reason) => Err(DomainError::forbidden(reason.to_string())),
        }
    }

    async fn resolve_role(&self, principal: &Principal) -> DomainResult<Option<Role>> {
        let mut tx = self.store.begin().await?;
        let Some(user) = tx.find_user_by_id(principal.user_id).await? else {
            return Ok(None);
        };
        let Some(role_id) = user.role_id else {
            return Ok(None);
        };
        let role = tx.find_role_by_id(role_id).await?;
        Ok(role)
    }
}

/// Pure check of a role against required permissions
pub(crate) fn evaluate(role: &Role, required: &[Permission]) -> AccessDecision {
    for requirement in required {
        let Some(granted) = role.actions_for(requirement.resource) else {
            return AccessDecision::Deny(DenyReason::MissingResource {
                resource: requirement.resource,
            });
        };

        let missing: Vec<Action> = requirement.actions.difference(granted).copied().collect();
        if !missing.is_empty() {
            return AccessDecision::Deny(DenyReason::MissingActions {
                resource: requirement.resource,
                actions: missing,
            });
        }
    }
    AccessDecision::Allow
}
