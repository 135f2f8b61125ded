use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::gate::{AuthorizationContext, SharedGate};
use crate::core::Config;
use crate::db::repository::UnknownPermissionPolicy;
use crate::db::{DbService, seed};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// Clone 成本极低 (连接池与 gate 均为 Arc)。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | gate | Arc<SharedGate> | 授权上下文，可通过 `reload_gate` 重建 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub gate: Arc<SharedGate>,
}

impl ServerState {
    /// Build the gate from the current registry
    pub async fn new(config: Config, pool: SqlitePool) -> Result<Self, AppError> {
        let ctx = AuthorizationContext::build(&pool).await?;
        Ok(Self {
            config,
            pool,
            gate: Arc::new(SharedGate::new(ctx)),
        })
    }

    /// 初始化服务器状态
    ///
    /// 1. 打开数据库并执行迁移 (`:memory:` 使用内存库)
    /// 2. 可选: 写入内置权限、角色和管理员
    /// 3. 根据权限表构建授权 gate
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = if config.database_path == ":memory:" {
            DbService::in_memory().await?
        } else {
            DbService::new(&config.database_path).await?
        };

        if config.seed_on_start {
            seed::run(&db.pool, &config.admin_email).await?;
        }

        Self::new(config.clone(), db.pool).await
    }

    /// Current authorization snapshot
    pub fn gate(&self) -> Arc<AuthorizationContext> {
        self.gate.current()
    }

    /// Re-register checks after the permission registry changed
    pub async fn reload_gate(&self) -> Result<(), AppError> {
        self.gate.reload(&self.pool).await?;
        Ok(())
    }

    pub fn permission_policy(&self) -> UnknownPermissionPolicy {
        self.config.unknown_permission_policy
    }
}
