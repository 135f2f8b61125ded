//! Auth API Handlers

use axum::Json;
use axum::extract::{Request, State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::AuthPayload;

/// GET /api/auth/permissions - `{ auth: { user, permissions } }`
///
/// Guests get `{ user: null, permissions: [] }`.
pub async fn permissions(
    State(state): State<ServerState>,
    req: Request,
) -> AppResult<Json<AuthPayload>> {
    let current = req.extensions().get::<CurrentUser>();
    let auth = state.gate().auth_payload(current.map(CurrentUser::user)).await?;
    Ok(Json(auth.into()))
}
