//! Role Model

use serde::{Deserialize, Serialize};

use super::permission::Permission;

/// Role entity (RBAC 角色)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// At most one role carries this flag
    pub is_default: bool,
    pub is_active: bool,
    /// Badge color used by the admin UI (e.g. "#FF0000")
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// Create-or-update payload keyed by `name`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleUpsert {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub color: String,
}

fn default_true() -> bool {
    true
}

/// Permission as listed under a role in the user forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionItem {
    pub name: String,
    pub description: String,
    pub is_active: bool,
}

impl From<Permission> for RolePermissionItem {
    fn from(p: Permission) -> Self {
        Self {
            name: p.name,
            description: p.description,
            is_active: p.is_active,
        }
    }
}

/// Role with its attached permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleWithPermissions {
    pub name: String,
    pub description: String,
    pub permissions: Vec<RolePermissionItem>,
}
