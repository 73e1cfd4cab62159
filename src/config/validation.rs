//! Configuration validation with helpful error messages

use anyhow::Result;

use super::{CheckConfig, ReqcheckConfig};
use crate::error::ManifestError;

/// Validate the entire configuration
pub fn validate_config(config: &ReqcheckConfig) -> Result<()> {
    validate_check(&config.check)?;
    Ok(())
}

/// Validate the `[check]` section
fn validate_check(check: &CheckConfig) -> Result<()> {
    validate_pattern(&check.pattern)?;

    if check.default_manifest.as_os_str().is_empty() {
        return Err(ManifestError::config_error_with_hint(
            "check.default_manifest cannot be empty",
            None,
            "Point it at your manifest, e.g. default_manifest = \"requirements.txt\"",
        )
        .into());
    }

    Ok(())
}

/// Validate the discovery glob
fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.trim().is_empty() {
        return Err(ManifestError::config_error_with_hint(
            "check.pattern cannot be empty",
            None,
            "Use a file-name glob such as \"requirements*.txt\"",
        )
        .into());
    }

    if pattern.contains('/') || pattern.contains('\\') {
        return Err(ManifestError::config_error_with_hint(
            format!("check.pattern '{}' must match file names, not paths", pattern),
            None,
            "Drop the directory part: \"requirements*.txt\" matches at any depth with --recursive",
        )
        .into());
    }

    glob::Pattern::new(pattern).map_err(|e| {
        ManifestError::config_error_with_hint(
            format!("check.pattern '{}' is not a valid glob", pattern),
            Some(e.into()),
            "Glob syntax: '*' any run of characters, '?' one character, '[abc]' a set",
        )
    })?;

    Ok(())
}
