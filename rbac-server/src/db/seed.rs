//! Bootstrap data
//!
//! Built-in permissions, the `admin` and `user` roles and one admin
//! account. Seeding only inserts what is missing, so it is safe to run on
//! each start: rows an administrator changed, deactivated or retired are
//! left alone.

use shared::models::{RoleUpsert, UserCreate, UserStatus};
use sqlx::SqlitePool;

use crate::auth::password::generate_password;
use crate::auth::permissions::{ADMIN_ROLE, ALL_PERMISSIONS, DEFAULT_ROLES};
use crate::db::repository::{RepoResult, permission, role, user};

const ADMIN_PASSWORD_LEN: usize = 20;

/// Insert catalogue permissions that are not registered yet.
///
/// Returns the number of rows created.
pub async fn seed_permissions(pool: &SqlitePool) -> RepoResult<usize> {
    let mut created = 0;
    for (name, description) in ALL_PERMISSIONS {
        if permission::insert_if_absent(pool, name, description).await? {
            created += 1;
        }
    }
    Ok(created)
}

/// Create missing bootstrap roles and grant their permissions.
///
/// Grants happen only when the role is created here; existing roles keep
/// whatever an administrator attached or detached. Permissions missing
/// from the registry are skipped.
pub async fn seed_roles(pool: &SqlitePool) -> RepoResult<usize> {
    let mut created = 0;
    for def in DEFAULT_ROLES {
        let Some(seeded) = role::insert_if_absent(
            pool,
            RoleUpsert {
                name: def.name.to_string(),
                description: def.description.to_string(),
                is_default: def.is_default,
                is_active: true,
                color: def.color.to_string(),
            },
        )
        .await?
        else {
            continue;
        };
        created += 1;

        for name in def.permissions {
            if permission::find_by_name(pool, name).await?.is_none() {
                tracing::warn!(role = def.name, permission = %name, "Seed skips unknown permission");
                continue;
            }
            role::attach(pool, seeded.id, name).await?;
        }
    }
    Ok(created)
}

/// Create the admin account if it does not exist yet.
///
/// Returns the generated password when an account was created.
pub async fn seed_admin(pool: &SqlitePool, email: &str) -> RepoResult<Option<String>> {
    if user::find_by_email(pool, email).await?.is_some() {
        return Ok(None);
    }
    let admin_role = role::find_by_name(pool, ADMIN_ROLE.name).await?;

    let password = generate_password(ADMIN_PASSWORD_LEN);
    user::create(
        pool,
        UserCreate {
            name: "Administrator".into(),
            email: email.to_string(),
            password: password.clone(),
            status: UserStatus::Active,
            role_id: admin_role.map(|r| r.id),
            email_verified: true,
        },
    )
    .await?;
    Ok(Some(password))
}

/// Run every seeder in order
pub async fn run(pool: &SqlitePool, admin_email: &str) -> RepoResult<()> {
    let permissions = seed_permissions(pool).await?;
    let roles = seed_roles(pool).await?;
    tracing::info!(permissions, roles, "Seed data applied");

    if let Some(password) = seed_admin(pool, admin_email).await? {
        tracing::warn!(email = %admin_email, %password, "Admin user created; change the password after the first login");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    #[tokio::test]
    async fn test_seed_is_repeatable() {
        let pool = test_pool().await;
        run(&pool, "admin@example.com").await.unwrap();
        run(&pool, "admin@example.com").await.unwrap();

        assert_eq!(permission::find_all(&pool).await.unwrap().len(), ALL_PERMISSIONS.len());
        assert_eq!(role::find_all(&pool).await.unwrap().len(), 2);

        let admin = role::find_by_name(&pool, "admin").await.unwrap().unwrap();
        let granted: Vec<String> = role::permissions_of(&pool, admin.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(granted.len(), ADMIN_ROLE.permissions.len());
        assert!(!granted.contains(&"view_admin".to_string()));

        let default = role::find_default(&pool).await.unwrap().unwrap();
        assert_eq!(default.name, "user");
    }

    #[tokio::test]
    async fn test_reseed_keeps_admin_changes() {
        let pool = test_pool().await;
        run(&pool, "admin@example.com").await.unwrap();

        let admin = role::find_by_name(&pool, "admin").await.unwrap().unwrap();
        permission::set_active(&pool, "delete_user", false).await.unwrap();
        assert!(permission::soft_delete(&pool, "force_delete_user").await.unwrap());
        assert!(role::detach(&pool, admin.id, "store_user").await.unwrap());
        role::set_default(&pool, admin.id).await.unwrap();

        run(&pool, "admin@example.com").await.unwrap();

        let delete_user = permission::find_by_name(&pool, "delete_user").await.unwrap().unwrap();
        assert!(!delete_user.is_active);
        assert!(permission::find_by_name(&pool, "force_delete_user").await.unwrap().is_none());

        let granted: Vec<String> = role::permissions_of(&pool, admin.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert!(!granted.contains(&"store_user".to_string()));

        let default = role::find_default(&pool).await.unwrap().unwrap();
        assert_eq!(default.name, "admin");
    }

    #[tokio::test]
    async fn test_first_seed_counts() {
        let pool = test_pool().await;
        assert_eq!(seed_permissions(&pool).await.unwrap(), ALL_PERMISSIONS.len());
        assert_eq!(seed_roles(&pool).await.unwrap(), DEFAULT_ROLES.len());
        assert_eq!(seed_permissions(&pool).await.unwrap(), 0);
        assert_eq!(seed_roles(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seed_admin_once() {
        let pool = test_pool().await;
        seed_permissions(&pool).await.unwrap();
        seed_roles(&pool).await.unwrap();

        let password = seed_admin(&pool, "root@example.com").await.unwrap().unwrap();
        assert_eq!(password.len(), ADMIN_PASSWORD_LEN);
        assert!(seed_admin(&pool, "root@example.com").await.unwrap().is_none());

        let admin = user::verify_credentials(&pool, "root@example.com", &password)
            .await
            .unwrap()
            .unwrap();
        let admin_role = role::find_by_name(&pool, "admin").await.unwrap().unwrap();
        assert_eq!(admin.role_id, Some(admin_role.id));
    }
}
