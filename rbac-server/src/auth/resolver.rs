//! Permission Resolver
//!
//! Effective permission set of a user: the user's override set when it is
//! non-empty, otherwise the permissions of the user's role. Never a union.

use std::collections::BTreeMap;

use shared::models::{Permission, PermissionView, User};
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, role, user};

/// Reads the junction tables on every call; nothing is cached.
#[derive(Clone)]
pub struct Resolver {
    pool: SqlitePool,
}

impl Resolver {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Effective permissions, de-duplicated and ordered by name.
    ///
    /// Inactive entries are reported with `is_active = false`.
    pub async fn resolve(&self, subject: &User) -> RepoResult<Vec<PermissionView>> {
        if subject.deleted_at.is_some() {
            return Ok(Vec::new());
        }

        let overrides = user::overrides_of(&self.pool, subject.id).await?;
        let source = if !overrides.is_empty() {
            overrides
        } else {
            match subject.role_id {
                Some(role_id) => role::permissions_of(&self.pool, role_id).await?,
                None => Vec::new(),
            }
        };

        Ok(to_views(source))
    }

    /// True iff `name` is in the effective set and active
    pub async fn has_permission(&self, subject: &User, name: &str) -> RepoResult<bool> {
        let effective = self.resolve(subject).await?;
        Ok(effective.iter().any(|p| p.name == name && p.is_active))
    }
}

fn to_views(permissions: Vec<Permission>) -> Vec<PermissionView> {
    let by_name: BTreeMap<String, bool> = permissions
        .into_iter()
        .map(|p| (p.name, p.is_active))
        .collect();
    by_name
        .into_iter()
        .map(|(name, is_active)| PermissionView { name, is_active })
        .collect()
}
