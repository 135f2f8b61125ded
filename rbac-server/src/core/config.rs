use crate::db::repository::UnknownPermissionPolicy;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | DATABASE_PATH | rbac.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | (未设置) | 日志目录，存在时按天滚动写文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DEV_IDENTITY_HEADER | false | 开发环境下接受 `x-dev-user-id` 请求头 |
/// | UNKNOWN_PERMISSION_POLICY | skip | sync 遇到未知权限名: skip / reject |
/// | SEED_ON_START | true | 启动时写入内置权限和角色 |
/// | ADMIN_EMAIL | admin@example.com | 种子管理员邮箱 |
///
/// ```ignore
/// DATABASE_PATH=/data/rbac.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// development | staging | production
    pub environment: String,
    /// Accept `x-dev-user-id` as the caller identity (development only)
    pub dev_identity_header: bool,
    pub unknown_permission_policy: UnknownPermissionPolicy,
    /// Parse error for `UNKNOWN_PERMISSION_POLICY`, reported once logging is up
    pub policy_fallback: Option<String>,
    pub seed_on_start: bool,
    pub admin_email: String,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置或无法解析时使用默认值
    pub fn from_env() -> Self {
        let (unknown_permission_policy, policy_fallback) =
            parse_policy(std::env::var("UNKNOWN_PERMISSION_POLICY").ok().as_deref());
        Self {
            database_path: std::env::var("DATABASE_PATH").unwrap_or_else(|_| "rbac.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            dev_identity_header: std::env::var("DEV_IDENTITY_HEADER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            unknown_permission_policy,
            policy_fallback,
            seed_on_start: std::env::var("SEED_ON_START")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@example.com".into()),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// The dev identity header needs both the flag and a development environment
    pub fn dev_identity_enabled(&self) -> bool {
        self.dev_identity_header && self.is_development()
    }

    /// Warn about settings that fell back to defaults. Call after the logger is initialised.
    pub fn log_fallbacks(&self) {
        if let Some(error) = &self.policy_fallback {
            tracing::warn!(
                error = %error,
                policy = %self.unknown_permission_policy,
                "Falling back to default permission policy"
            );
        }
    }
}

/// Unset means the default; an invalid value also falls back but keeps the error
fn parse_policy(raw: Option<&str>) -> (UnknownPermissionPolicy, Option<String>) {
    match raw.map(str::parse::<UnknownPermissionPolicy>) {
        Some(Ok(policy)) => (policy, None),
        Some(Err(e)) => (UnknownPermissionPolicy::default(), Some(e)),
        None => (UnknownPermissionPolicy::default(), None),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_overrides() {
        let config = Config::with_overrides(":memory:", 0);
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.http_port, 0);
    }

    #[test]
    fn test_environment_flags() {
        let mut config = Config::with_overrides("rbac.db", 3000);
        config.environment = "production".into();
        assert!(!config.is_development());
        config.environment = "development".into();
        assert!(config.is_development());
    }

    #[test]
    fn test_dev_identity_needs_flag_and_environment() {
        let mut config = Config::with_overrides("rbac.db", 3000);
        config.environment = "development".into();
        config.dev_identity_header = false;
        assert!(!config.dev_identity_enabled());

        config.dev_identity_header = true;
        assert!(config.dev_identity_enabled());

        config.environment = "production".into();
        assert!(!config.dev_identity_enabled());
    }

    #[test]
    fn test_bad_policy_is_kept_for_logging() {
        assert_eq!(parse_policy(None), (UnknownPermissionPolicy::Skip, None));
        assert_eq!(parse_policy(Some("reject")), (UnknownPermissionPolicy::Reject, None));

        let (policy, fallback) = parse_policy(Some("sometimes"));
        assert_eq!(policy, UnknownPermissionPolicy::Skip);
        assert!(fallback.unwrap().contains("sometimes"));
    }

    #[test]
    fn test_dev_identity_off_by_default() {
        if std::env::var_os("DEV_IDENTITY_HEADER").is_some() {
            return;
        }
        assert!(!Config::from_env().dev_identity_enabled());
    }
}
