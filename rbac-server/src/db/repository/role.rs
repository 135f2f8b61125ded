//! Role Repository
//!
//! Roles and the `role_permission` junction.

use super::{RepoError, RepoResult, UnknownPermissionPolicy, permission};
use shared::error::ErrorCode;
use shared::models::{Permission, Role, RolePermissionItem, RoleUpsert, RoleWithPermissions};
use sqlx::{SqliteConnection, SqlitePool};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, is_default, is_active, color, deleted_at FROM roles WHERE deleted_at IS NULL ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, is_default, is_active, color, deleted_at FROM roles WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, is_default, is_active, color, deleted_at FROM roles WHERE name = ? AND deleted_at IS NULL LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

pub async fn find_default(pool: &SqlitePool) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, description, is_default, is_active, color, deleted_at FROM roles WHERE is_default = 1 AND deleted_at IS NULL LIMIT 1",
    )
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

/// Create or update by name. Marking a role default clears the flag on
/// every other role in the same transaction.
pub async fn upsert(pool: &SqlitePool, data: RoleUpsert) -> RepoResult<Role> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Role name must not be empty".into()));
    }
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    if data.is_default {
        clear_default(&mut tx, Some(&data.name), now).await?;
    }

    sqlx::query(
        "INSERT INTO roles (name, description, is_default, is_active, color, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
         ON CONFLICT(name) DO UPDATE SET description = excluded.description, is_default = excluded.is_default, is_active = excluded.is_active, color = excluded.color, updated_at = excluded.updated_at, deleted_at = NULL",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.is_default)
    .bind(data.is_active)
    .bind(&data.color)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    find_by_name(pool, &data.name)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Failed to upsert role {}", data.name)))
}

/// Create a role unless the name is already taken, live or retired.
///
/// `is_default` is honoured only while no live role holds the flag.
/// Returns `None` when nothing was inserted.
pub async fn insert_if_absent(pool: &SqlitePool, data: RoleUpsert) -> RepoResult<Option<Role>> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Role name must not be empty".into()));
    }
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let current_default: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM roles WHERE is_default = 1 AND deleted_at IS NULL LIMIT 1",
    )
    .fetch_optional(&mut *tx)
    .await?;

    let rows = sqlx::query(
        "INSERT INTO roles (name, description, is_default, is_active, color, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
         ON CONFLICT(name) DO NOTHING",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.is_default && current_default.is_none())
    .bind(data.is_active)
    .bind(&data.color)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    if rows.rows_affected() == 0 {
        return Ok(None);
    }
    find_by_name(pool, &data.name).await
}

/// Make `id` the single default role
pub async fn set_default(pool: &SqlitePool, id: i64) -> RepoResult<Role> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))?;
    if existing.is_default {
        return Ok(existing);
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    clear_default(&mut tx, None, now).await?;
    sqlx::query("UPDATE roles SET is_default = 1, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(role_id = id, role = %existing.name, "Default role changed");

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))
}

async fn clear_default(
    conn: &mut SqliteConnection,
    except_name: Option<&str>,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE roles SET is_default = 0, updated_at = ?1 WHERE is_default = 1 AND (?2 IS NULL OR name <> ?2)",
    )
    .bind(now)
    .bind(except_name)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Soft-delete a role and move its users to the default role.
///
/// Returns the number of reassigned users.
pub async fn soft_delete(pool: &SqlitePool, id: i64) -> RepoResult<u64> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {id} not found")))?;

    if existing.is_default {
        return Err(RepoError::Business(
            ErrorCode::RoleIsDefault,
            format!("Cannot delete default role '{}'", existing.name),
        ));
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let default_id: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM roles WHERE is_default = 1 AND deleted_at IS NULL LIMIT 1",
    )
    .fetch_optional(&mut *tx)
    .await?;

    let members: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role_id = ? AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    let reassigned = match default_id {
        Some(default_id) => sqlx::query(
            "UPDATE users SET role_id = ?1, updated_at = ?2 WHERE role_id = ?3 AND deleted_at IS NULL",
        )
        .bind(default_id)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected(),
        None if members > 0 => {
            return Err(RepoError::Business(
                ErrorCode::NoDefaultRole,
                format!("Cannot delete role '{}': no default role to move its users to", existing.name),
            ));
        }
        None => 0,
    };

    sqlx::query("UPDATE roles SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2")
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(role_id = id, role = %existing.name, reassigned, "Role deleted");
    Ok(reassigned)
}

// =============================================================================
// role_permission
// =============================================================================

/// Live permissions attached to a role, ordered by name
pub async fn permissions_of(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT p.id, p.name, p.description, p.is_active, p.deleted_at FROM permissions p \
         JOIN role_permission rp ON rp.permission_id = p.id \
         JOIN roles r ON r.id = rp.role_id \
         WHERE rp.role_id = ? AND p.deleted_at IS NULL AND r.deleted_at IS NULL ORDER BY p.name",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

/// Attach one permission by name. Returns false when already attached.
pub async fn attach(pool: &SqlitePool, role_id: i64, permission_name: &str) -> RepoResult<bool> {
    ensure_role(pool, role_id).await?;
    let permission = permission::find_by_name(pool, permission_name)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Permission {permission_name} not found")))?;

    let rows = sqlx::query(
        "INSERT OR IGNORE INTO role_permission (role_id, permission_id) VALUES (?1, ?2)",
    )
    .bind(role_id)
    .bind(permission.id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Detach one permission by name. Returns false when it was not attached.
pub async fn detach(pool: &SqlitePool, role_id: i64, permission_name: &str) -> RepoResult<bool> {
    let rows = sqlx::query(
        "DELETE FROM role_permission WHERE role_id = ?1 AND permission_id IN (SELECT id FROM permissions WHERE name = ?2)",
    )
    .bind(role_id)
    .bind(permission_name)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Replace the role's permission set with exactly `names` in one transaction
pub async fn sync_permissions(
    pool: &SqlitePool,
    role_id: i64,
    names: &[String],
    policy: UnknownPermissionPolicy,
) -> RepoResult<Vec<Permission>> {
    ensure_role(pool, role_id).await?;

    let mut tx = pool.begin().await?;
    let ids = permission::ids_for_names(&mut tx, names, policy).await?;

    sqlx::query("DELETE FROM role_permission WHERE role_id = ?")
        .bind(role_id)
        .execute(&mut *tx)
        .await?;
    for permission_id in &ids {
        sqlx::query("INSERT INTO role_permission (role_id, permission_id) VALUES (?1, ?2)")
            .bind(role_id)
            .bind(permission_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(role_id, attached = ids.len(), requested = names.len(), "Role permissions synced");
    permissions_of(pool, role_id).await
}

/// Every live role with its permissions (user create form)
pub async fn find_all_with_permissions(pool: &SqlitePool) -> RepoResult<Vec<RoleWithPermissions>> {
    let roles = find_all(pool).await?;
    let mut result = Vec::with_capacity(roles.len());
    for role in roles {
        let permissions = permissions_of(pool, role.id)
            .await?
            .into_iter()
            .map(RolePermissionItem::from)
            .collect();
        result.push(RoleWithPermissions {
            name: role.name,
            description: role.description,
            permissions,
        });
    }
    Ok(result)
}

async fn ensure_role(pool: &SqlitePool, role_id: i64) -> RepoResult<()> {
    if find_by_id(pool, role_id).await?.is_none() {
        return Err(RepoError::Business(
            ErrorCode::RoleNotFound,
            format!("Role {role_id} not found"),
        ));
    }
    Ok(())
}
