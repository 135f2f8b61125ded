//! Dashboard API Handlers

use axum::Json;
use axum::extract::{Request, State};

use crate::auth::CurrentUserExt;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::AuthPayload;

/// GET /api/dashboard - page props (the shared `auth` section)
pub async fn index(State(state): State<ServerState>, req: Request) -> AppResult<Json<AuthPayload>> {
    let current = req.current_user()?;
    let auth = state.gate().auth_payload(Some(current.user())).await?;
    Ok(Json(auth.into()))
}
