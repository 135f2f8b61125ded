//! RBAC Server - 基于角色的权限解析与授权 gate
//!
//! # 模块结构
//!
//! ```text
//! rbac-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # resolver、gate、路由守卫、密码
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接池、仓储、种子数据
//! └── utils/         # 错误、日志、校验
//! ```
//!
//! 权限解析规则: 用户存在覆盖权限时仅使用覆盖集合，否则使用角色的权限集合。

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use auth::{AuthorizationContext, CurrentUser, Resolver};
pub use crate::core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
