//! 认证授权模块
//!
//! - [`Resolver`] - 计算用户的有效权限集
//! - [`AuthorizationContext`] - 按权限名注册的检查 (gate)
//! - [`require_permission`] - 路由守卫
//! - [`password`] - argon2 密码哈希

pub mod gate;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod resolver;

pub use gate::{AuthorizationContext, SharedGate};
pub use middleware::{CurrentUser, CurrentUserExt, dev_user_header, require_permission};
pub use resolver::Resolver;
