//! Permission Repository
//!
//! The registry of permission names. Soft-deleted rows are invisible to
//! every lookup here.

use super::{RepoError, RepoResult, UnknownPermissionPolicy};
use shared::error::ErrorCode;
use shared::models::{Permission, PermissionUpsert};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeSet;

/// All live permissions, active or not
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description, is_active, deleted_at FROM permissions WHERE deleted_at IS NULL ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

/// Permissions offered to administrators (`is_active = true`)
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description, is_active, deleted_at FROM permissions WHERE deleted_at IS NULL AND is_active = 1 ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(permissions)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Permission>> {
    let permission = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description, is_active, deleted_at FROM permissions WHERE name = ? AND deleted_at IS NULL LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(permission)
}

/// Create or update by name. A soft-deleted row with the same name is restored.
pub async fn upsert(pool: &SqlitePool, data: PermissionUpsert) -> RepoResult<Permission> {
    if data.name.trim().is_empty() {
        return Err(RepoError::Validation("Permission name must not be empty".into()));
    }
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO permissions (name, description, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4) \
         ON CONFLICT(name) DO UPDATE SET description = excluded.description, is_active = excluded.is_active, updated_at = excluded.updated_at, deleted_at = NULL",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.is_active)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_name(pool, &data.name)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Failed to upsert permission {}", data.name)))
}

/// Flip `is_active`. Associations are left untouched.
pub async fn set_active(pool: &SqlitePool, name: &str, is_active: bool) -> RepoResult<Permission> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE permissions SET is_active = ?1, updated_at = ?2 WHERE name = ?3 AND deleted_at IS NULL",
    )
    .bind(is_active)
    .bind(now)
    .bind(name)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Permission {name} not found")));
    }
    find_by_name(pool, name)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Permission {name} not found")))
}

/// Retire a permission. Historical association rows are kept.
pub async fn soft_delete(pool: &SqlitePool, name: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE permissions SET deleted_at = ?1, updated_at = ?1 WHERE name = ?2 AND deleted_at IS NULL",
    )
    .bind(now)
    .bind(name)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Insert unless the name is already taken, live or retired.
/// Existing rows keep their `is_active` and `deleted_at`.
pub async fn insert_if_absent(pool: &SqlitePool, name: &str, description: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "INSERT INTO permissions (name, description, is_active, created_at, updated_at) VALUES (?1, ?2, 1, ?3, ?3) \
         ON CONFLICT(name) DO NOTHING",
    )
    .bind(name)
    .bind(description)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Map names to ids on an open connection/transaction, applying `policy`
/// to names the registry does not know.
pub(crate) async fn ids_for_names(
    conn: &mut SqliteConnection,
    names: &[String],
    policy: UnknownPermissionPolicy,
) -> RepoResult<Vec<i64>> {
    let unique: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    let mut ids = Vec::with_capacity(unique.len());

    for name in unique {
        let id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM permissions WHERE name = ? AND deleted_at IS NULL LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

        match (id, policy) {
            (Some(id), _) => ids.push(id),
            (None, UnknownPermissionPolicy::Skip) => {
                tracing::warn!(permission = %name, "Skipping unknown permission");
            }
            (None, UnknownPermissionPolicy::Reject) => {
                return Err(RepoError::Business(
                    ErrorCode::PermissionNotFound,
                    format!("Permission '{name}' not found"),
                ));
            }
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    fn up(name: &str, is_active: bool) -> PermissionUpsert {
        PermissionUpsert {
            name: name.into(),
            description: format!("desc {name}"),
            is_active,
        }
    }

    #[tokio::test]
    async fn test_upsert_is_keyed_by_name() {
        let pool = test_pool().await;
        let first = upsert(&pool, up("view_users", true)).await.unwrap();
        let second = upsert(
            &pool,
            PermissionUpsert {
                name: "view_users".into(),
                description: "View Users".into(),
                is_active: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.description, "View Users");
        assert_eq!(find_all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_rejects_blank_name() {
        let pool = test_pool().await;
        let err = upsert(&pool, up("  ", true)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_find_active_filters_inactive() {
        let pool = test_pool().await;
        upsert(&pool, up("view_dashboard", true)).await.unwrap();
        upsert(&pool, up("view_admin", false)).await.unwrap();

        let active: Vec<String> = find_active(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(active, vec!["view_dashboard"]);
        assert_eq!(find_all(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_active_and_missing() {
        let pool = test_pool().await;
        upsert(&pool, up("view_users", true)).await.unwrap();

        let p = set_active(&pool, "view_users", false).await.unwrap();
        assert!(!p.is_active);

        let err = set_active(&pool, "nope", true).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_and_upsert_restores() {
        let pool = test_pool().await;
        upsert(&pool, up("restore_user", true)).await.unwrap();

        assert!(soft_delete(&pool, "restore_user").await.unwrap());
        assert!(!soft_delete(&pool, "restore_user").await.unwrap());
        assert!(find_by_name(&pool, "restore_user").await.unwrap().is_none());

        let restored = upsert(&pool, up("restore_user", true)).await.unwrap();
        assert!(restored.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_ids_for_names_policies() {
        let pool = test_pool().await;
        let known = upsert(&pool, up("view_users", true)).await.unwrap();
        let names = vec![
            "view_users".to_string(),
            "nonexistent_permission".to_string(),
            "view_users".to_string(),
        ];

        let mut conn = pool.acquire().await.unwrap();
        let ids = ids_for_names(&mut conn, &names, UnknownPermissionPolicy::Skip)
            .await
            .unwrap();
        assert_eq!(ids, vec![known.id]);

        let err = ids_for_names(&mut conn, &names, UnknownPermissionPolicy::Reject)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::PermissionNotFound, _)
        ));
    }

    #[tokio::test]
    async fn test_insert_if_absent_keeps_state() {
        let pool = test_pool().await;
        assert!(insert_if_absent(&pool, "view_users", "View Users").await.unwrap());
        set_active(&pool, "view_users", false).await.unwrap();
        assert!(!insert_if_absent(&pool, "view_users", "View Users").await.unwrap());
        assert!(!find_by_name(&pool, "view_users").await.unwrap().unwrap().is_active);

        insert_if_absent(&pool, "export_users", "Export Users").await.unwrap();
        soft_delete(&pool, "export_users").await.unwrap();
        assert!(!insert_if_absent(&pool, "export_users", "Export Users").await.unwrap());
        assert!(find_by_name(&pool, "export_users").await.unwrap().is_none());
    }
}
