//! Role administration bodies.

use serde::{Deserialize, Serialize};
use validator::Validate;

use sf_core::domain::entities::{Permission, Role};
use sf_core::services::RoleUpdate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleBody {
    #[validate(length(min = 3, max = 50, message = "name must be between 3 and 50 characters"))]
    pub name: String,

    /// Unknown resources or actions are rejected while parsing the body
    pub permissions: Vec<Permission>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleBody {
    #[validate(length(min = 3, max = 50, message = "name must be between 3 and 50 characters"))]
    pub name: Option<String>,

    pub permissions: Option<Vec<Permission>>,
}

impl From<UpdateRoleBody> for RoleUpdate {
    fn from(body: UpdateRoleBody) -> Self {
        RoleUpdate {
            name: body.name,
            permissions: body.permissions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub permissions: Vec<Permission>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id.to_string(),
            name: role.name,
            permissions: role.permissions,
            created_at: role.created_at.to_rfc3339(),
            updated_at: role.updated_at.to_rfc3339(),
        }
    }
}
