//! Authorization Gate
//!
//! [`AuthorizationContext`] maps every registered permission name to an
//! async check. It is built from a registry snapshot; permissions added
//! later are unknown to it until [`SharedGate::reload`] swaps in a fresh
//! context.
//!
//! ```ignore
//! let gate = AuthorizationContext::build(&pool).await?;
//! if gate.can(Some(&user), "view_users").await? {
//!     // ...
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use shared::SharedAuth;
use shared::models::{PermissionView, User};
use sqlx::SqlitePool;

use super::resolver::Resolver;
use crate::db::repository::{RepoResult, permission};

/// Future returned by a named check
pub type CheckFuture<'a> = BoxFuture<'a, RepoResult<bool>>;

type Check = Box<dyn for<'a> Fn(&'a User) -> CheckFuture<'a> + Send + Sync>;

fn boxed_check<F>(f: F) -> Check
where
    F: for<'a> Fn(&'a User) -> CheckFuture<'a> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Name-keyed registry of authorization checks
pub struct AuthorizationContext {
    resolver: Resolver,
    checks: HashMap<String, Check>,
}

impl AuthorizationContext {
    /// Register one check per live permission (active or not)
    pub async fn build(pool: &SqlitePool) -> RepoResult<Self> {
        let permissions = permission::find_all(pool).await?;
        let ctx = Self::from_names(pool.clone(), permissions.iter().map(|p| p.name.as_str()));
        tracing::info!(checks = ctx.checks.len(), "Authorization gate built");
        Ok(ctx)
    }

    /// Register resolver-backed checks for `names`
    pub fn from_names<'n>(pool: SqlitePool, names: impl IntoIterator<Item = &'n str>) -> Self {
        let mut ctx = Self {
            resolver: Resolver::new(pool),
            checks: HashMap::new(),
        };
        for name in names {
            ctx.define_permission(name);
        }
        ctx
    }

    fn define_permission(&mut self, name: &str) {
        let resolver = self.resolver.clone();
        let owned = name.to_string();
        self.checks.insert(
            name.to_string(),
            boxed_check(move |user| {
                let resolver = resolver.clone();
                let name = owned.clone();
                async move { resolver.has_permission(user, &name).await }.boxed()
            }),
        );
    }

    /// Register (or replace) a custom check under `name`
    pub fn define<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: for<'a> Fn(&'a User) -> CheckFuture<'a> + Send + Sync + 'static,
    {
        self.checks.insert(name.into(), boxed_check(check));
    }

    /// `Ok(false)` for an absent user or an unregistered name
    pub async fn can(&self, user: Option<&User>, name: &str) -> RepoResult<bool> {
        let Some(user) = user else {
            return Ok(false);
        };
        match self.checks.get(name) {
            Some(check) => check(user).await,
            None => {
                tracing::debug!(permission = %name, "Check requested for unregistered permission");
                Ok(false)
            }
        }
    }

    pub async fn effective_permissions(&self, user: &User) -> RepoResult<Vec<PermissionView>> {
        self.resolver.resolve(user).await
    }

    /// The `auth` section shipped to the client
    pub async fn auth_payload(&self, user: Option<&User>) -> RepoResult<SharedAuth> {
        let Some(user) = user else {
            return Ok(SharedAuth::guest());
        };
        Ok(SharedAuth {
            user: Some(user.clone()),
            permissions: self.effective_permissions(user).await?,
        })
    }

    /// Registered names, sorted
    pub fn registered(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }
}

impl fmt::Debug for AuthorizationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationContext")
            .field("registered", &self.registered())
            .finish()
    }
}

/// Swappable handle to the current context
///
/// Readers clone the inner `Arc` and never hold the lock across an await.
pub struct SharedGate {
    current: RwLock<Arc<AuthorizationContext>>,
}

impl SharedGate {
    pub fn new(ctx: AuthorizationContext) -> Self {
        Self {
            current: RwLock::new(Arc::new(ctx)),
        }
    }

    pub fn current(&self) -> Arc<AuthorizationContext> {
        self.current.read().clone()
    }

    /// Rebuild from the registry and replace the snapshot
    pub async fn reload(&self, pool: &SqlitePool) -> RepoResult<()> {
        let fresh = AuthorizationContext::build(pool).await?;
        *self.current.write() = Arc::new(fresh);
        tracing::info!("Authorization gate reloaded");
        Ok(())
    }
}

impl fmt::Debug for SharedGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedGate").field(&*self.current()).finish()
    }
}
