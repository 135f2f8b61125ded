//! Shared types for the RBAC workspace
//!
//! Models, the unified error system and the client-boundary authorization
//! payload used by both the server and its clients.

pub mod auth;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use auth::{AuthPayload, SharedAuth};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
