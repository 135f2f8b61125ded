//! Permission Model

use serde::{Deserialize, Serialize};

/// Permission entity
///
/// `name` is the stable identity used by roles, overrides and the gate.
/// The numeric id never leaves the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    /// Soft delete marker (epoch millis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

impl Permission {
    /// Client-facing `{name, is_active}` projection
    pub fn view(&self) -> PermissionView {
        PermissionView {
            name: self.name.clone(),
            is_active: self.is_active,
        }
    }
}

/// `{name, is_active}` pair shipped to the client boundary
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionView {
    pub name: String,
    pub is_active: bool,
}

/// Permission offered to administrators in user/role forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailablePermission {
    pub name: String,
    pub description: String,
}

impl From<Permission> for AvailablePermission {
    fn from(p: Permission) -> Self {
        Self {
            name: p.name,
            description: p.description,
        }
    }
}

/// Upsert payload keyed by `name`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionUpsert {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
