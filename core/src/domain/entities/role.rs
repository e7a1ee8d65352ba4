//! Role and permission entities used by the access evaluator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult, ValidationError};

/// Name of the built-in administrator role
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Protected resource families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Users,
    Products,
    Category,
    Settings,
    Orders,
    Reviews,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Products => "products",
            Resource::Category => "category",
            Resource::Settings => "settings",
            Resource::Orders => "orders",
            Resource::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Resource::Users),
            "products" => Ok(Resource::Products),
            "category" => Ok(Resource::Category),
            "settings" => Ok(Resource::Settings),
            "orders" => Ok(Resource::Orders),
            "reviews" => Ok(Resource::Reviews),
            other => Err(format!("Unknown resource: {}", other)),
        }
    }
}

/// Operations that can be granted on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Create, Action::Read, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of actions granted (or required) on one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub resource: Resource,
    pub actions: BTreeSet<Action>,
}

impl Permission {
    pub fn new(resource: Resource, actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            resource,
            actions: actions.into_iter().collect(),
        }
    }

    /// Every action on the resource
    pub fn all(resource: Resource) -> Self {
        Self::new(resource, Action::ALL)
    }
}

/// Role entity: a named, ordered list of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,

    /// Unique role name
    pub name: String,

    /// Permissions, at most one entry per resource
    pub permissions: Vec<Permission>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Creates a role, rejecting permission lists that name a resource twice
    pub fn new(name: impl Into<String>, permissions: Vec<Permission>) -> DomainResult<Self> {
        ensure_unique_resources(&permissions)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            permissions,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_super_admin(&self) -> bool {
        self.name == SUPER_ADMIN_ROLE
    }

    /// Actions granted on `resource`, if the role mentions it at all
    pub fn actions_for(&self, resource: Resource) -> Option<&BTreeSet<Action>> {
        self.permissions
            .iter()
            .find(|p| p.resource == resource)
            .map(|p| &p.actions)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    pub fn replace_permissions(&mut self, permissions: Vec<Permission>) -> DomainResult<()> {
        ensure_unique_resources(&permissions)?;
        self.permissions = permissions;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn ensure_unique_resources(permissions: &[Permission]) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for permission in permissions {
        if !seen.insert(permission.resource) {
            return Err(DomainError::Validation(ValidationError::DuplicateValue {
                field: format!("permissions.{}", permission.resource),
            }));
        }
    }
    Ok(())
}
