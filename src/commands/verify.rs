//! Verify command - check an installed-package set against a manifest
//!
//! Usage:
//!   pip freeze > installed.txt
//!   reqcheck verify requirements.txt --installed installed.txt

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use crate::config::ReqcheckConfig;
use crate::installed::InstalledSet;
use crate::manifest::Manifest;
use crate::utils::terminal::{plural, print_success};

/// Verify installed packages satisfy a manifest
#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// Manifest to verify (default: check.default_manifest)
    pub path: Option<PathBuf>,

    /// Freeze-style file listing installed packages as name==version
    #[arg(long, short = 'i')]
    pub installed: PathBuf,
}

impl VerifyCommand {
    /// Execute the verify command
    pub fn execute(self, config: &ReqcheckConfig) -> Result<()> {
        let path = self
            .path
            .unwrap_or_else(|| config.check.default_manifest.clone());

        let manifest = Manifest::load(&path)?;
        let installed = InstalledSet::from_manifest(&Manifest::load(&self.installed)?)?;
        tracing::debug!(installed = installed.len(), "loaded installed set");

        let failures = installed.verify(&manifest);
        for failure in &failures {
            failure.display_with_hints();
        }

        if !failures.is_empty() {
            bail!(
                "{} not satisfied by {}",
                plural(failures.len(), "requirement", "requirements"),
                self.installed.display()
            );
        }

        print_success(&format!(
            "{} satisfied",
            plural(manifest.len(), "requirement", "requirements")
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_verify_command() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("requirements.txt");
        let installed = temp.path().join("installed.txt");
        fs::write(&manifest, "pytest>=7.4.2\nrequests>=2.31.0\n").unwrap();
        fs::write(&installed, "pytest==7.4.3\nrequests==2.31.0\nurllib3==2.1.0\n").unwrap();

        let cmd = VerifyCommand { path: Some(manifest.clone()), installed: installed.clone() };
        assert!(cmd.execute(&ReqcheckConfig::default()).is_ok());

        fs::write(&installed, "pytest==7.3.0\n").unwrap();
        let cmd = VerifyCommand { path: Some(manifest), installed };
        let err = cmd.execute(&ReqcheckConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("2 requirements not satisfied"));
    }
}
