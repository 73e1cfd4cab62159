//! Check command - validate one or more manifests
//!
//! Usage:
//!   reqcheck check                          # check.default_manifest
//!   reqcheck check requirements*.txt        # explicit files
//!   reqcheck check --recursive .            # every matching file below .
//!   reqcheck check --strict                 # unconstrained entries are errors

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use rayon::prelude::*;
use tracing::debug;

use crate::config::ReqcheckConfig;
use crate::error::ManifestError;
use crate::manifest::{Located, Manifest};
use crate::utils::paths::collect_manifests;
use crate::utils::terminal::{plural, print_error, print_success, print_warning};

/// Validate requirement manifests
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Manifest files, or directories with --recursive
    pub paths: Vec<PathBuf>,

    /// Search directories for files matching check.pattern
    #[arg(short, long)]
    pub recursive: bool,

    /// Treat entries without a version constraint as errors
    #[arg(long)]
    pub strict: bool,
}

/// Outcome of checking one manifest
struct ManifestReport {
    path: PathBuf,
    outcome: Result<Manifest, ManifestError>,
}

impl ManifestReport {
    /// Entries declared without any version constraint
    fn unconstrained(&self) -> Vec<&Located> {
        match &self.outcome {
            Ok(manifest) => manifest
                .located()
                .iter()
                .filter(|l| l.entry.constraint.is_none())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl CheckCommand {
    /// Execute the check command
    pub fn execute(self, config: &ReqcheckConfig) -> Result<()> {
        let paths = if self.paths.is_empty() {
            vec![config.check.default_manifest.clone()]
        } else {
            self.paths
        };

        let manifests = collect_manifests(&paths, &config.check.pattern, self.recursive)?;
        if manifests.is_empty() {
            bail!("No manifests found matching '{}'", config.check.pattern);
        }

        let strict = self.strict || config.check.require_constraints;
        debug!(count = manifests.len(), strict, "checking manifests");

        // collect() keeps input order
        let reports: Vec<ManifestReport> = manifests
            .par_iter()
            .map(|path| check_manifest(path))
            .collect();

        let mut failed = 0;
        for report in &reports {
            if !print_report(report, strict) {
                failed += 1;
            }
        }

        if failed > 0 {
            bail!(
                "{} of {} failed",
                failed,
                plural(reports.len(), "manifest", "manifests")
            );
        }
        Ok(())
    }
}

fn check_manifest(path: &Path) -> ManifestReport {
    ManifestReport {
        path: path.to_path_buf(),
        outcome: Manifest::load(path),
    }
}

/// Print one report; returns whether the manifest passed
fn print_report(report: &ManifestReport, strict: bool) -> bool {
    let manifest = match &report.outcome {
        Ok(manifest) => manifest,
        Err(err) => {
            err.display_with_hints();
            return false;
        }
    };

    let unconstrained = report.unconstrained();
    for located in &unconstrained {
        let message = format!(
            "{}:{}: '{}' has no version constraint",
            located.origin, located.line, located.entry.name
        );
        if strict {
            print_error(&message);
        } else {
            print_warning(&message);
        }
    }

    if strict && !unconstrained.is_empty() {
        return false;
    }

    print_success(&format!(
        "{}: {}",
        report.path.display(),
        plural(manifest.len(), "entry", "entries")
    ));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unconstrained_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        std::fs::write(&path, "pytest>=7.4.2\nfaker\nfreezegun  # time travel\n").unwrap();

        let report = check_manifest(&path);
        let names: Vec<_> = report
            .unconstrained()
            .iter()
            .map(|l| l.entry.name.as_str())
            .collect();
        assert_eq!(names, vec!["faker", "freezegun"]);
        assert!(!print_report(&report, true));
        assert!(print_report(&report, false));
    }

    #[test]
    fn test_failed_load_fails_report() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        std::fs::write(&path, "pytest>=>7.4.2\n").unwrap();

        let report = check_manifest(&path);
        assert!(report.unconstrained().is_empty());
        assert!(!print_report(&report, false));
    }

    #[test]
    fn test_execute_reports_failure() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("requirements.txt");
        let bad = temp.path().join("requirements-dev.txt");
        std::fs::write(&good, "pytest>=7.4.2\n").unwrap();
        std::fs::write(&bad, "requests>=2.31.0\nrequests>=2.20.0\n").unwrap();

        let config = ReqcheckConfig::default();
        let ok = CheckCommand { paths: vec![good.clone()], recursive: false, strict: false };
        assert!(ok.execute(&config).is_ok());

        let both = CheckCommand { paths: vec![temp.path().to_path_buf()], recursive: true, strict: false };
        let err = both.execute(&config).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 manifests failed");
    }
}
