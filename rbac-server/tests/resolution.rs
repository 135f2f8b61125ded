//! Effective-permission resolution and gate behaviour against a seeded database.

use rbac_server::AuthorizationContext;
use rbac_server::db::DbService;
use rbac_server::db::repository::{RepoError, UnknownPermissionPolicy, permission, role, user};
use rbac_server::db::seed;
use rbac_server::ErrorCode;
use shared::models::{PermissionView, RoleUpsert, User, UserCreate, UserStatus};
use sqlx::SqlitePool;

async fn seeded_pool() -> SqlitePool {
    let pool = DbService::in_memory().await.unwrap().pool;
    seed::seed_permissions(&pool).await.unwrap();
    seed::seed_roles(&pool).await.unwrap();
    pool
}

async fn role_id(pool: &SqlitePool, name: &str) -> i64 {
    role::find_by_name(pool, name).await.unwrap().unwrap().id
}

async fn new_user(pool: &SqlitePool, email: &str, role: Option<i64>) -> User {
    user::create(
        pool,
        UserCreate {
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: email.into(),
            password: "password".into(),
            status: UserStatus::Active,
            role_id: role,
            email_verified: true,
        },
    )
    .await
    .unwrap()
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn names(views: &[PermissionView]) -> Vec<String> {
    views.iter().map(|v| v.name.clone()).collect()
}

/// Admin role reduced to `{view_users, store_user}` for the scenarios below
async fn narrow_admin(pool: &SqlitePool) -> i64 {
    let admin = role_id(pool, "admin").await;
    role::sync_permissions(
        pool,
        admin,
        &owned(&["view_users", "store_user"]),
        UnknownPermissionPolicy::Skip,
    )
    .await
    .unwrap();
    admin
}

#[tokio::test]
async fn role_permissions_apply_without_overrides() {
    let pool = seeded_pool().await;
    let admin = narrow_admin(&pool).await;
    let a = new_user(&pool, "a@example.com", Some(admin)).await;
    let gate = AuthorizationContext::build(&pool).await.unwrap();

    assert!(gate.can(Some(&a), "view_users").await.unwrap());
    assert!(!gate.can(Some(&a), "delete_user").await.unwrap());

    let from_role: Vec<String> = role::permissions_of(&pool, admin)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names(&gate.effective_permissions(&a).await.unwrap()), from_role);
}

#[tokio::test]
async fn overrides_replace_role_permissions() {
    let pool = seeded_pool().await;
    let admin = narrow_admin(&pool).await;
    let b = new_user(&pool, "b@example.com", Some(admin)).await;
    user::sync_permissions(&pool, b.id, &owned(&["view_dashboard"]), UnknownPermissionPolicy::Skip)
        .await
        .unwrap();
    let gate = AuthorizationContext::build(&pool).await.unwrap();

    assert_eq!(names(&gate.effective_permissions(&b).await.unwrap()), vec!["view_dashboard"]);
    assert!(gate.can(Some(&b), "view_dashboard").await.unwrap());
    assert!(!gate.can(Some(&b), "view_users").await.unwrap());
}

#[tokio::test]
async fn clearing_overrides_reverts_to_role() {
    let pool = seeded_pool().await;
    let admin = narrow_admin(&pool).await;
    let b = new_user(&pool, "b@example.com", Some(admin)).await;
    user::sync_permissions(&pool, b.id, &owned(&["view_dashboard"]), UnknownPermissionPolicy::Skip)
        .await
        .unwrap();
    user::sync_permissions(&pool, b.id, &[], UnknownPermissionPolicy::Skip)
        .await
        .unwrap();
    let gate = AuthorizationContext::build(&pool).await.unwrap();

    assert_eq!(
        names(&gate.effective_permissions(&b).await.unwrap()),
        vec!["store_user", "view_users"]
    );
}

#[tokio::test]
async fn role_sync_is_idempotent_and_skips_unknown_names() {
    let pool = seeded_pool().await;
    let admin = role_id(&pool, "admin").await;
    let wanted = owned(&["view_users", "nonexistent_permission"]);

    let first = role::sync_permissions(&pool, admin, &wanted, UnknownPermissionPolicy::Skip)
        .await
        .unwrap();
    let second = role::sync_permissions(&pool, admin, &wanted, UnknownPermissionPolicy::Skip)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].name, "view_users");
}

#[tokio::test]
async fn reject_policy_fails_whole_sync() {
    let pool = seeded_pool().await;
    let admin = role_id(&pool, "admin").await;
    let before = role::permissions_of(&pool, admin).await.unwrap();

    let err = role::sync_permissions(
        &pool,
        admin,
        &owned(&["view_users", "nonexistent_permission"]),
        UnknownPermissionPolicy::Reject,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RepoError::Business(ErrorCode::PermissionNotFound, _)));
    assert_eq!(role::permissions_of(&pool, admin).await.unwrap(), before);
}

#[tokio::test]
async fn guests_and_unregistered_names_are_denied() {
    let pool = seeded_pool().await;
    let admin = role_id(&pool, "admin").await;
    let a = new_user(&pool, "a@example.com", Some(admin)).await;
    let gate = AuthorizationContext::build(&pool).await.unwrap();

    for name in ["view_users", "view_dashboard", "made_up"] {
        assert!(!gate.can(None, name).await.unwrap());
    }
    assert!(!gate.can(Some(&a), "made_up").await.unwrap());
}

#[tokio::test]
async fn deactivation_revokes_on_both_sides() {
    let pool = seeded_pool().await;
    let user_role = role_id(&pool, "user").await;
    let u = new_user(&pool, "u@example.com", Some(user_role)).await;
    permission::set_active(&pool, "view_dashboard", false).await.unwrap();
    let gate = AuthorizationContext::build(&pool).await.unwrap();

    assert!(!gate.can(Some(&u), "view_dashboard").await.unwrap());

    let auth = gate.auth_payload(Some(&u)).await.unwrap();
    assert_eq!(
        auth.permissions,
        vec![PermissionView {
            name: "view_dashboard".into(),
            is_active: false
        }]
    );
    assert!(!auth.can("view_dashboard"));
}

#[tokio::test]
async fn new_permissions_need_a_reload() {
    let pool = seeded_pool().await;
    let admin = role_id(&pool, "admin").await;
    let a = new_user(&pool, "a@example.com", Some(admin)).await;
    let shared_gate = rbac_server::auth::SharedGate::new(AuthorizationContext::build(&pool).await.unwrap());

    permission::upsert(
        &pool,
        shared::models::PermissionUpsert {
            name: "export_users".into(),
            description: "Export Users".into(),
            is_active: true,
        },
    )
    .await
    .unwrap();
    role::attach(&pool, admin, "export_users").await.unwrap();

    assert!(!shared_gate.current().can(Some(&a), "export_users").await.unwrap());
    shared_gate.reload(&pool).await.unwrap();
    assert!(shared_gate.current().can(Some(&a), "export_users").await.unwrap());
}

#[tokio::test]
async fn single_default_role_and_reassignment() {
    let pool = seeded_pool().await;
    let editor = role::upsert(
        &pool,
        RoleUpsert {
            name: "editor".into(),
            description: "Editor".into(),
            is_default: false,
            is_active: true,
            color: "#0000FF".into(),
        },
    )
    .await
    .unwrap();
    let e = new_user(&pool, "e@example.com", Some(editor.id)).await;

    // promoting editor demotes user
    role::set_default(&pool, editor.id).await.unwrap();
    let defaults: Vec<String> = role::find_all(&pool)
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.is_default)
        .map(|r| r.name)
        .collect();
    assert_eq!(defaults, vec!["editor"]);

    let err = role::soft_delete(&pool, editor.id).await.unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::RoleIsDefault, _)));

    let user_role = role_id(&pool, "user").await;
    role::set_default(&pool, user_role).await.unwrap();
    assert_eq!(role::soft_delete(&pool, editor.id).await.unwrap(), 1);

    let moved = user::find_by_id(&pool, e.id).await.unwrap().unwrap();
    assert_eq!(moved.role_id, Some(user_role));
}

#[tokio::test]
async fn password_hash_never_serialized() {
    let pool = seeded_pool().await;
    let u = new_user(&pool, "p@example.com", None).await;
    let gate = AuthorizationContext::build(&pool).await.unwrap();

    let json = serde_json::to_value(gate.auth_payload(Some(&u)).await.unwrap()).unwrap();
    assert!(json["user"].get("password").is_none());
    assert_eq!(json["user"]["email"], "p@example.com");
    assert_eq!(json["permissions"], serde_json::json!([]));
}
