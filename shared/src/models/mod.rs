//! Data models shared between the server and the client boundary

pub mod permission;
pub mod role;
pub mod user;

pub use permission::{AvailablePermission, Permission, PermissionUpsert, PermissionView};
pub use role::{Role, RolePermissionItem, RoleUpsert, RoleWithPermissions};
pub use user::{User, UserCreate, UserPermissionsSync, UserStatus, UserWithRole};
