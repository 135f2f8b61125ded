//! Admin User API Handlers

use axum::{Extension, Json};
use axum::extract::{Path, State};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{permission, role, user};
use crate::utils::validation::validate_permission_names;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    AvailablePermission, PermissionView, Role, RoleWithPermissions, User, UserPermissionsSync,
    UserWithRole,
};

/// Payload of the "create user" form
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateForm {
    pub roles: Vec<RoleWithPermissions>,
    pub available_permissions: Vec<AvailablePermission>,
}

/// Payload of the "edit user" form
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditForm {
    pub user: UserWithRole,
    pub roles: Vec<Role>,
    /// Every registered permission name
    pub permissions: Vec<String>,
    pub available_permissions: Vec<AvailablePermission>,
    /// Current override set (empty when the role applies)
    pub user_permissions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub user: UserWithRole,
    pub effective_permissions: Vec<PermissionView>,
    pub has_overrides: bool,
}

#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub user_id: i64,
    pub overrides: Vec<String>,
    pub permissions: Vec<PermissionView>,
}

async fn available_permissions(state: &ServerState) -> AppResult<Vec<AvailablePermission>> {
    Ok(permission::find_active(&state.pool)
        .await?
        .into_iter()
        .map(AvailablePermission::from)
        .collect())
}

async fn load_user(state: &ServerState, id: i64) -> AppResult<User> {
    user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found")))
}

async fn load_user_with_role(state: &ServerState, subject: User) -> AppResult<UserWithRole> {
    let role = match subject.role_id {
        Some(id) => role::find_by_id(&state.pool, id).await?,
        None => None,
    };
    Ok(UserWithRole {
        role_name: role.as_ref().map(|r| r.name.clone()),
        role_color: role.map(|r| r.color),
        user: subject,
    })
}

/// GET /api/admin/users - users with their role
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserWithRole>>> {
    let users = user::find_all_with_role(&state.pool).await?;
    Ok(Json(users))
}

/// GET /api/admin/users/create - roles with permissions + active permissions
pub async fn create_form(State(state): State<ServerState>) -> AppResult<Json<CreateForm>> {
    let roles = role::find_all_with_permissions(&state.pool).await?;
    Ok(Json(CreateForm {
        roles,
        available_permissions: available_permissions(&state).await?,
    }))
}

/// GET /api/admin/users/{id}
pub async fn show(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserDetail>> {
    let subject = load_user(&state, id).await?;
    let gate = state.gate();
    let effective_permissions = gate.effective_permissions(&subject).await?;
    let has_overrides = !user::overrides_of(&state.pool, id).await?.is_empty();

    Ok(Json(UserDetail {
        user: load_user_with_role(&state, subject).await?,
        effective_permissions,
        has_overrides,
    }))
}

/// GET /api/admin/users/{id}/edit
pub async fn edit_form(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EditForm>> {
    let subject = load_user(&state, id).await?;
    let user_permissions = user::overrides_of(&state.pool, id)
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();
    let permissions = permission::find_all(&state.pool)
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    Ok(Json(EditForm {
        user: load_user_with_role(&state, subject).await?,
        roles: role::find_all(&state.pool).await?,
        permissions,
        available_permissions: available_permissions(&state).await?,
        user_permissions,
    }))
}

/// PUT /api/admin/users/{id}/permissions - replace the override set
///
/// An empty list clears the overrides.
pub async fn sync_permissions(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPermissionsSync>,
) -> AppResult<Json<SyncResult>> {
    validate_permission_names(&payload.permissions)?;

    let overrides = user::sync_permissions(
        &state.pool,
        id,
        &payload.permissions,
        state.permission_policy(),
    )
    .await?;

    tracing::info!(
        actor_id = current.user().id,
        user_id = id,
        overrides = overrides.len(),
        "User permission overrides updated"
    );

    let subject = load_user(&state, id).await?;
    let permissions = state.gate().effective_permissions(&subject).await?;
    Ok(Json(SyncResult {
        user_id: id,
        overrides: overrides.into_iter().map(|p| p.name).collect(),
        permissions,
    }))
}
