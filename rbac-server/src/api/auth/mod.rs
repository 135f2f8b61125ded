//! Auth API Module
//!
//! Client-boundary payload; open to guests.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/auth/permissions", get(handler::permissions))
}
