//! Input validation helpers
//!
//! Length limits and checks for request payloads.

use crate::utils::AppError;

/// Permission and role names
pub const MAX_NAME_LEN: usize = 100;

/// Upper bound on names accepted by a single sync request
pub const MAX_SYNC_ITEMS: usize = 500;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate a list of permission names submitted for a sync.
///
/// Unknown names are not an error here; the sync policy decides that.
pub fn validate_permission_names(names: &[String]) -> Result<(), AppError> {
    if names.len() > MAX_SYNC_ITEMS {
        return Err(AppError::validation(format!(
            "permissions has too many entries ({}, max {MAX_SYNC_ITEMS})",
            names.len()
        )));
    }
    for name in names {
        validate_required_text(name, "permission name", MAX_NAME_LEN)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("view_users", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(101), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn test_permission_names() {
        assert!(validate_permission_names(&[]).is_ok());
        assert!(validate_permission_names(&["view_users".into(), "ghost".into()]).is_ok());
        let err = validate_permission_names(&["".into()]).unwrap_err();
        assert!(err.message.contains("permission name"));
    }
}
