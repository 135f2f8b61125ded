//! API 路由模块
//!
//! - [`admin_users`] - 用户管理页面数据与权限覆盖
//! - [`auth`] - 客户端授权载荷
//! - [`dashboard`] - 仪表盘

pub mod admin_users;
pub mod auth;
pub mod dashboard;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::{DEV_USER_HEADER, dev_user_header};
use crate::core::ServerState;

/// Build a router with all routes registered (no outer middleware)
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(admin_users::router(state))
        .merge(dashboard::router(state))
        .merge(auth::router())
}

/// Build the application with all middleware
///
/// Used by the HTTP server and by oneshot tests. The dev identity layer is
/// only mounted when the config enables it.
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let app = build_router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    if !state.config.dev_identity_enabled() {
        return app;
    }
    tracing::warn!(header = DEV_USER_HEADER, "Dev identity header enabled; callers can pick any user");
    // Runs before the route guards and fills in CurrentUser
    app.layer(axum::middleware::from_fn_with_state(
        state.clone(),
        dev_user_header,
    ))
}
