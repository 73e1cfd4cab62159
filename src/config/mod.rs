//! reqcheck.toml configuration
//!
//! All keys are optional:
//!
//! ```toml
//! [check]
//! require_constraints = false
//! pattern = "requirements*.txt"
//! default_manifest = "requirements.txt"
//!
//! [format]
//! sort = false
//! ```
//!
//! Lookup order: `--config` / `REQCHECK_CONFIG`, then `./reqcheck.toml`,
//! then `<user config dir>/reqcheck/config.toml`, then built-in defaults.

pub mod validation;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::error::{hints, ManifestError};

/// Name of the project-local configuration file
pub const CONFIG_FILE_NAME: &str = "reqcheck.toml";

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReqcheckConfig {
    pub check: CheckConfig,
    pub format: FormatConfig,
}

/// `[check]` section
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Treat entries without a version constraint as errors
    pub require_constraints: bool,
    /// Glob matched against file names during recursive discovery
    pub pattern: String,
    /// Manifest used when no path is given on the command line
    pub default_manifest: PathBuf,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            require_constraints: false,
            pattern: "requirements*.txt".to_string(),
            default_manifest: PathBuf::from("requirements.txt"),
        }
    }
}

/// `[format]` section
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Sort entries by name within each block
    pub sort: bool,
}

impl ReqcheckConfig {
    /// Resolve and load configuration. An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::load_from_path(&local);
        }

        if let Some(user) = user_config_path() {
            if user.is_file() {
                return Self::load_from_path(&user);
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        debug!(config = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            ManifestError::config_error_with_hint(
                "Failed to parse reqcheck.toml",
                Some(e.into()),
                hints::invalid_config(),
            )
        })?;

        validation::validate_config(&config)?;
        Ok(config)
    }
}

/// `<user config dir>/reqcheck/config.toml`, when a home directory exists
fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "reqcheck")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
