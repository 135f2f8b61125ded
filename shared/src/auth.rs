//! Client-boundary authorization payload
//!
//! Every rendered page carries `{ auth: { user, permissions } }`. The UI
//! decides what to show with [`SharedAuth::can`], which must agree with the
//! server-side gate: a permission counts only when it is listed for the
//! current user and active.

use serde::{Deserialize, Serialize};

use crate::models::{PermissionView, User};

/// `auth` section of the page payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SharedAuth {
    pub user: Option<User>,
    #[serde(default)]
    pub permissions: Vec<PermissionView>,
}

impl SharedAuth {
    /// Payload for an unauthenticated visitor
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Client-side permission predicate
    pub fn can(&self, permission: &str) -> bool {
        if self.user.is_none() {
            return false;
        }
        self.permissions
            .iter()
            .any(|p| p.name == permission && p.is_active)
    }
}

/// Top-level page payload: `{ "auth": { ... } }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthPayload {
    pub auth: SharedAuth,
}

impl From<SharedAuth> for AuthPayload {
    fn from(auth: SharedAuth) -> Self {
        Self { auth }
    }
}
