//! Repository Module
//!
//! SQLite access for the permission registry, roles, users and the two
//! junction tables. Functions take a `&SqlitePool`; multi-statement writes
//! run inside a single transaction.

pub mod permission;
pub mod role;
pub mod user;

use shared::error::ErrorCode;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{1}")]
    Business(ErrorCode, String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// What `sync` does with names that are not in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPermissionPolicy {
    /// Drop the name, log a warning, keep going
    #[default]
    Skip,
    /// Fail the whole sync; nothing is written
    Reject,
}

impl fmt::Display for UnknownPermissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for UnknownPermissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "reject" | "strict" => Ok(Self::Reject),
            other => Err(format!("unknown permission policy: {other}")),
        }
    }
}
