//! 授权中间件
//!
//! Route guards backed by the authorization gate.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::models::User;

use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::AppError;

/// Header carrying a user id when `DEV_IDENTITY_HEADER` is on
pub const DEV_USER_HEADER: &str = "x-dev-user-id";

/// Authenticated user, inserted into request extensions by the
/// authentication layer. Absent means unauthenticated.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn user(&self) -> &User {
        &self.0
    }
}

type GuardFuture = Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>>;

/// 权限检查中间件 - 要求特定权限
///
/// | 情况 | 结果 |
/// |------|------|
/// | 无 CurrentUser | 401 NotAuthenticated |
/// | gate 拒绝 | 403 PermissionDenied |
/// | 存储错误 | 500 DatabaseError |
///
/// ```ignore
/// Router::new()
///     .route("/api/admin/users", get(handler::list))
///     .layer(middleware::from_fn_with_state(state.clone(), require_permission("view_users")));
/// ```
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(State<ServerState>, Request, Next) -> GuardFuture + Clone {
    move |State(state): State<ServerState>, req: Request, next: Next| {
        Box::pin(async move {
            let Some(current) = req.extensions().get::<CurrentUser>().cloned() else {
                security_log!(
                    "WARN",
                    "auth_missing",
                    uri = format!("{:?}", req.uri()),
                    required_permission = permission
                );
                return Err(AppError::not_authenticated());
            };

            let gate = state.gate();
            if !gate.can(Some(current.user()), permission).await? {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = current.0.id,
                    email = current.0.email.clone(),
                    required_permission = permission
                );
                return Err(AppError::permission_denied(permission));
            }

            Ok(next.run(req).await)
        })
    }
}

/// Development-only stand-in for the session layer.
///
/// Loads the user named by the `x-dev-user-id` header into [`CurrentUser`].
/// The header is ignored unless [`Config::dev_identity_enabled`] holds.
///
/// [`Config::dev_identity_enabled`]: crate::core::Config::dev_identity_enabled
pub async fn dev_user_header(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.dev_identity_enabled() {
        return Ok(next.run(req).await);
    }

    let user_id = req
        .headers()
        .get(DEV_USER_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());

    if let Some(id) = user_id {
        match user::find_by_id(&state.pool, id).await? {
            Some(found) => {
                req.extensions_mut().insert(CurrentUser(found));
            }
            None => {
                security_log!("WARN", "dev_user_unknown", user_id = id);
            }
        }
    }

    Ok(next.run(req).await)
}

/// 从请求中提取 CurrentUser 的扩展方法
pub trait CurrentUserExt {
    /// 未认证返回 401
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::not_authenticated)
    }
}
