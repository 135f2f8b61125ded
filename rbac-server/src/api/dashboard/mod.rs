//! Dashboard API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::VIEW_DASHBOARD;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/dashboard", get(handler::index))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(VIEW_DASHBOARD),
        ))
}
