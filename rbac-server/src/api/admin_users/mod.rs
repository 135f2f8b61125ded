//! Admin User API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::permissions::{STORE_USER, UPDATE_USER, VIEW_USERS};
use crate::auth::require_permission;
use crate::core::ServerState;

/// Each route group carries its own guard. The static `/create` segment
/// takes priority over `/{id}`.
pub fn router(state: &ServerState) -> Router<ServerState> {
    let view = Router::new()
        .route("/api/admin/users", get(handler::list))
        .route("/api/admin/users/{id}", get(handler::show))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(VIEW_USERS),
        ));

    let store = Router::new()
        .route("/api/admin/users/create", get(handler::create_form))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(STORE_USER),
        ));

    let update = Router::new()
        .route("/api/admin/users/{id}/edit", get(handler::edit_form))
        .route("/api/admin/users/{id}/permissions", put(handler::sync_permissions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_permission(UPDATE_USER),
        ));

    view.merge(store).merge(update)
}
