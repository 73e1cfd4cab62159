//! Fmt command - rewrite a manifest in canonical form
//!
//! Usage:
//!   reqcheck fmt                  # rewrite check.default_manifest in place
//!   reqcheck fmt dev.txt --sort   # sort entries within each block
//!   reqcheck fmt --check          # fail if not formatted, write nothing
//!   reqcheck fmt --stdout         # print instead of writing

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tempfile::NamedTempFile;

use crate::config::ReqcheckConfig;
use crate::manifest::{canonical, Manifest};
use crate::utils::terminal::{print_error, print_info, print_success};

/// Format a manifest
#[derive(Args, Debug)]
pub struct FmtCommand {
    /// Manifest to format (default: check.default_manifest)
    pub path: Option<PathBuf>,

    /// Exit with an error if the file is not already formatted
    #[arg(long, conflicts_with = "stdout")]
    pub check: bool,

    /// Sort entries by name within each block
    #[arg(long)]
    pub sort: bool,

    /// Print the formatted manifest instead of writing it
    #[arg(long)]
    pub stdout: bool,
}

impl FmtCommand {
    /// Execute the fmt command
    pub fn execute(self, config: &ReqcheckConfig) -> Result<()> {
        let path = self
            .path
            .unwrap_or_else(|| config.check.default_manifest.clone());

        // Refuse to format anything that does not load cleanly
        let manifest = Manifest::load(&path)?;
        let formatted = canonical::render(&manifest, self.sort || config.format.sort);

        if self.stdout {
            print!("{}", formatted);
            return Ok(());
        }

        let original = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let changed = original != formatted;

        if self.check {
            if changed {
                print_error(&format!("{} is not formatted", path.display()));
                bail!("Run `reqcheck fmt {}` to fix it", path.display());
            }
            print_success(&format!("{} is formatted", path.display()));
            return Ok(());
        }

        if !changed {
            print_info(&format!("{} already formatted", path.display()));
            return Ok(());
        }

        write_atomically(&path, &formatted)?;
        print_success(&format!("Formatted {}", path.display()));
        Ok(())
    }
}

/// Write through a temp file in the same directory, then rename over `path`
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    temp.write_all(contents.as_bytes())
        .context("Failed to write formatted manifest")?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
