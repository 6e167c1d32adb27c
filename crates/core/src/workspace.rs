//! Workspace name rules.
//!
//! Workspace names travel into Terraform CLI arguments and remote state
//! paths, so only URL-safe characters are accepted. Validation happens
//! before any subcommand is issued.

use crate::error::CoreError;

/// Workspace used when a submission does not name one.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Maximum workspace name length.
const MAX_NAME_LEN: usize = 255;

/// Validate a workspace name against `^[A-Za-z0-9\-_.~]{1,255}$`.
pub fn validate_workspace_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(CoreError::InvalidWorkspaceName);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
    {
        return Err(CoreError::InvalidWorkspaceName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_url_safe_names() {
        for name in ["default", "stage-1", "a", "Prod_2024", "v1.2~rc"] {
            assert!(validate_workspace_name(name).is_ok(), "{name} rejected");
        }
    }

    #[test]
    fn rejects_empty_name() {
        assert!(validate_workspace_name("").is_err());
    }

    #[test]
    fn rejects_unsafe_characters() {
        for name in ["with space", "slash/name", "semi;colon", "uni\u{e9}", "a+b"] {
            assert!(validate_workspace_name(name).is_err(), "{name} accepted");
        }
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_workspace_name(&name).is_err());
        let name = "a".repeat(MAX_NAME_LEN);
        assert!(validate_workspace_name(&name).is_ok());
    }
}
