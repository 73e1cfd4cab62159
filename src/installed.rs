//! Installed-package sets and constraint verification
//!
//! An installed set is read from a freeze-style manifest where every line is
//! pinned, e.g. `requests==2.31.0`. Verification reports every manifest entry
//! the set does not satisfy.

use std::collections::HashMap;

use crate::error::ManifestError;
use crate::manifest::{normalize_name, Manifest};
use crate::version::Version;

/// Exact versions present in an environment, keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct InstalledSet {
    versions: HashMap<String, Version>,
}

impl InstalledSet {
    /// Build from a freeze-style manifest. Every entry must be a single `==` pin.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, ManifestError> {
        let mut versions = HashMap::new();

        for located in manifest.located() {
            let pinned = located
                .entry
                .constraint
                .as_ref()
                .and_then(|c| c.pinned_version())
                .ok_or_else(|| {
                    ManifestError::parse(
                        located.origin.clone(),
                        located.line,
                        located.entry.to_string(),
                        "installed packages must be pinned with a single '==<version>'",
                    )
                })?;
            versions.insert(located.entry.normalized_name(), pinned.clone());
        }

        Ok(Self { versions })
    }

    /// Installed version of `name`, if any
    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.versions.get(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Check every manifest entry against this set, in declaration order
    pub fn verify(&self, manifest: &Manifest) -> Vec<ManifestError> {
        let mut failures = Vec::new();

        for located in manifest.located() {
            let entry = &located.entry;
            let constraint = entry.constraint.as_ref();

            let reason = match (self.version_of(&entry.name), constraint) {
                (None, _) => Some("package is not installed".to_string()),
                (Some(installed), Some(c)) if !c.allows(installed, true) => Some(format!(
                    "installed version {} does not satisfy '{}'",
                    installed, c
                )),
                _ => None,
            };

            if let Some(reason) = reason {
                failures.push(ManifestError::UnresolvableConstraint {
                    origin: located.origin.clone(),
                    line: located.line,
                    name: entry.name.clone(),
                    constraint: constraint.map(|c| c.to_string()),
                    reason,
                });
            }
        }

        failures
    }
}
