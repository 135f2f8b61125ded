//! Permission Definitions
//!
//! The built-in catalogue and the two bootstrap roles.
//!
//! ## 命名
//! - `view_*` 只读页面
//! - `store_*` / `update_*` / `delete_*` 写操作
//! - `restore_*` / `force_delete_*` 软删除相关

/// Built-in permissions: `(name, description)`
pub const ALL_PERMISSIONS: &[(&str, &str)] = &[
    ("view_dashboard", "View Dashboard"),
    ("view_admin", "View Admin"),
    ("view_users", "View Users"),
    ("store_user", "Create User"),
    ("update_user", "Update User"),
    ("delete_user", "Delete User"),
    ("restore_user", "Restore User"),
    ("force_delete_user", "Force Delete User"),
];

pub const VIEW_DASHBOARD: &str = "view_dashboard";
pub const VIEW_USERS: &str = "view_users";
pub const STORE_USER: &str = "store_user";
pub const UPDATE_USER: &str = "update_user";

/// Bootstrap role definition
#[derive(Debug, Clone, Copy)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub is_default: bool,
    pub color: &'static str,
    pub permissions: &'static [&'static str],
}

/// Admin: every user-management permission. `view_admin` is intentionally
/// not granted to any bootstrap role.
pub const ADMIN_ROLE: RoleDefinition = RoleDefinition {
    name: "admin",
    description: "Administrator with full access",
    is_default: false,
    color: "#FF0000",
    permissions: &[
        "view_dashboard",
        "view_users",
        "store_user",
        "update_user",
        "delete_user",
        "restore_user",
        "force_delete_user",
    ],
};

/// Default role for new accounts
pub const USER_ROLE: RoleDefinition = RoleDefinition {
    name: "user",
    description: "Regular user with limited access",
    is_default: true,
    color: "#00FF00",
    permissions: &["view_dashboard"],
};

pub const DEFAULT_ROLES: &[RoleDefinition] = &[ADMIN_ROLE, USER_ROLE];
