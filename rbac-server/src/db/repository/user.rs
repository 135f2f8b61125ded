//! User Repository
//!
//! Accounts, their role assignment and the `permission_user` override set.

use super::{RepoError, RepoResult, UnknownPermissionPolicy, permission, role};
use crate::auth::password;
use shared::error::ErrorCode;
use shared::models::{Permission, User, UserCreate, UserStatus, UserWithRole};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE email = ? AND deleted_at IS NULL LIMIT 1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Admin listing: live users with their role name and color
pub async fn find_all_with_role(pool: &SqlitePool) -> RepoResult<Vec<UserWithRole>> {
    let users = sqlx::query_as::<_, UserWithRole>(
        "SELECT u.*, r.name AS role_name, r.color AS role_color FROM users u \
         LEFT JOIN roles r ON r.id = u.role_id AND r.deleted_at IS NULL \
         WHERE u.deleted_at IS NULL ORDER BY u.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(users)
}

/// Create a user. The password is hashed with argon2; a missing role falls
/// back to the default role.
pub async fn create(pool: &SqlitePool, data: UserCreate) -> RepoResult<User> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("User name must not be empty".into()));
    }
    if !data.email.contains('@') {
        return Err(RepoError::Validation(format!("Invalid email: {}", data.email)));
    }
    if data.password.is_empty() {
        return Err(RepoError::Validation("Password must not be empty".into()));
    }

    let role_id = match data.role_id {
        Some(id) => {
            role::find_by_id(pool, id).await?.ok_or_else(|| {
                RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found"))
            })?;
            Some(id)
        }
        None => role::find_default(pool).await?.map(|r| r.id),
    };

    let hash = password::hash_password(&data.password)
        .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))?;

    let now = shared::util::now_millis();
    let verified_at = data.email_verified.then_some(now);

    let result = sqlx::query(
        "INSERT INTO users (name, email, password, status, role_id, email_verified_at, last_password_change_at, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?7)",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&hash)
    .bind(data.status)
    .bind(role_id)
    .bind(verified_at)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::UserEmailExists,
            format!("Email '{}' already exists", data.email),
        ),
        other => other,
    })?;

    let id = result.last_insert_rowid();
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
}

/// Point the user at another role (or none)
pub async fn assign_role(pool: &SqlitePool, user_id: i64, role_id: Option<i64>) -> RepoResult<User> {
    if let Some(id) = role_id
        && role::find_by_id(pool, id).await?.is_none()
    {
        return Err(RepoError::Business(
            ErrorCode::RoleNotFound,
            format!("Role {id} not found"),
        ));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE users SET role_id = ?1, updated_at = ?2 WHERE id = ?3 AND deleted_at IS NULL",
    )
    .bind(role_id)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(user_not_found(user_id));
    }
    find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn set_status(pool: &SqlitePool, user_id: i64, status: UserStatus) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE users SET status = ?1, updated_at = ?2 WHERE id = ?3 AND deleted_at IS NULL",
    )
    .bind(status)
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(user_not_found(user_id));
    }
    find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn soft_delete(pool: &SqlitePool, user_id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE users SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Look up by email and check the password. `None` on any mismatch.
pub async fn verify_credentials(
    pool: &SqlitePool,
    email: &str,
    plain: &str,
) -> RepoResult<Option<User>> {
    let Some(user) = find_by_email(pool, email).await? else {
        return Ok(None);
    };
    let ok = password::verify_password(plain, &user.password)
        .map_err(|e| RepoError::Database(format!("Stored password hash is invalid: {e}")))?;
    Ok(ok.then_some(user))
}

// =============================================================================
// permission_user
// =============================================================================

/// The user's direct override permissions (live rows only), ordered by name
pub async fn overrides_of(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.name, p.description, p.is_active, p.deleted_at FROM permissions p \
         JOIN permission_user pu ON pu.permission_id = p.id \
         WHERE pu.user_id = ? AND p.deleted_at IS NULL ORDER BY p.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

/// Replace the user's override set. An empty list clears it, so the user
/// falls back to the role's permissions.
pub async fn sync_permissions(
    pool: &SqlitePool,
    user_id: i64,
    names: &[String],
    policy: UnknownPermissionPolicy,
) -> RepoResult<Vec<Permission>> {
    if find_by_id(pool, user_id).await?.is_none() {
        return Err(user_not_found(user_id));
    }

    let mut tx = pool.begin().await?;
    let ids = permission::ids_for_names(&mut tx, names, policy).await?;

    sqlx::query("DELETE FROM permission_user WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    for permission_id in &ids {
        sqlx::query("INSERT INTO permission_user (user_id, permission_id) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(permission_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(user_id, attached = ids.len(), requested = names.len(), "User permissions synced");
    overrides_of(pool, user_id).await
}

fn user_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found"))
}
