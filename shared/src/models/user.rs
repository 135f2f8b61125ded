//! User Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserStatus {
    Active,
    Inactive,
    #[default]
    Pending,
    Suspended,
    Banned,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Suspended => "suspended",
            Self::Banned => "banned",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            "suspended" => Ok(Self::Suspended),
            "banned" => Ok(Self::Banned),
            other => Err(format!("unknown user status: {other}")),
        }
    }
}

/// User entity
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub status: UserStatus,
    /// Nullable in storage; a user without a role holds no permissions
    pub role_id: Option<i64>,
    pub avatar: Option<String>,
    pub email_verified_at: Option<i64>,
    pub first_login_at: Option<i64>,
    pub last_login_at: Option<i64>,
    pub last_password_change_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
}

/// User row joined with its role, for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserWithRole {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub user: User,
    pub role_name: Option<String>,
    pub role_color: Option<String>,
}

/// Create user payload (plain-text password, hashed before storage)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub status: UserStatus,
    /// Falls back to the default role when absent
    pub role_id: Option<i64>,
    #[serde(default)]
    pub email_verified: bool,
}

/// Replace-the-set payload for user overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPermissionsSync {
    pub permissions: Vec<String>,
}
