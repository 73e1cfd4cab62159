//! Requirement manifest loading
//!
//! A manifest is an ordered list of [`DependencyEntry`] records read from a
//! line-oriented file. Loading either succeeds completely or fails with the
//! first error; a partially parsed manifest is never returned.
//!
//! ```text
//! # Test runner
//! pytest>=7.4.2
//! pytest-xdist>=3.3.1  # parallel runs
//! -r base-requirements.txt
//! ```

pub mod canonical;
pub mod entry;
pub mod parser;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use entry::{normalize_name, DependencyEntry};
pub use parser::Line;

use crate::error::ManifestError;

/// An entry together with where it was declared
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub entry: DependencyEntry,
    pub origin: String,
    pub line: usize,
}

/// A parsed physical line of the top-level file
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    pub number: usize,
    pub line: Line,
}

/// A fully loaded manifest
#[derive(Debug, Clone)]
pub struct Manifest {
    origin: String,
    lines: Vec<SourceLine>,
    entries: Vec<Located>,
}

impl Manifest {
    /// Parse manifest text held in memory. `origin` labels error messages.
    ///
    /// Include directives are rejected: there is no file to resolve them
    /// against.
    pub fn parse_str(text: &str, origin: impl Into<String>) -> Result<Self, ManifestError> {
        let origin = origin.into();
        let mut loader = Loader::default();
        let lines = loader.read_lines(text, &origin, None)?;
        Ok(Manifest {
            origin,
            lines,
            entries: loader.entries,
        })
    }

    /// Read and parse a manifest file, following `-r` includes
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let mut loader = Loader::default();
        let lines = loader.load_file(path)?;
        debug!(
            manifest = %path.display(),
            entries = loader.entries.len(),
            files = loader.loaded.len(),
            "loaded manifest"
        );
        Ok(Manifest {
            origin: path.display().to_string(),
            lines,
            entries: loader.entries,
        })
    }

    /// Where this manifest came from (file path or label)
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Entries in declaration order, includes expanded in place
    pub fn entries(&self) -> impl Iterator<Item = &DependencyEntry> {
        self.entries.iter().map(|l| &l.entry)
    }

    /// Entries with their origin and line number
    pub fn located(&self) -> &[Located] {
        &self.entries
    }

    /// Physical lines of the top-level file
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by name (normalized comparison)
    pub fn get(&self, name: &str) -> Option<&DependencyEntry> {
        self.find(name).map(|l| &l.entry)
    }

    /// Line number where `name` is declared
    pub fn line_of(&self, name: &str) -> Option<usize> {
        self.find(name).map(|l| l.line)
    }

    fn find(&self, name: &str) -> Option<&Located> {
        let key = normalize_name(name);
        self.entries.iter().find(|l| l.entry.normalized_name() == key)
    }

    /// Render the entry set back into the line format, one entry per line
    pub fn to_manifest_string(&self) -> String {
        let mut out = String::new();
        for entry in self.entries() {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_manifest_string())
    }
}

/// Load state shared across a file and everything it includes
#[derive(Default)]
struct Loader {
    /// Files currently being read, for cycle detection
    stack: Vec<PathBuf>,
    loaded: HashSet<PathBuf>,
    /// normalized name -> (origin, line)
    seen: HashMap<String, (String, usize)>,
    entries: Vec<Located>,
}

impl Loader {
    fn load_file(&mut self, path: &Path) -> Result<Vec<SourceLine>, ManifestError> {
        let origin = path.display().to_string();
        let io_error = |source| ManifestError::Io {
            origin: origin.clone(),
            source,
        };

        let text = fs::read_to_string(path).map_err(io_error)?;
        let canonical = path.canonicalize().map_err(io_error)?;

        self.loaded.insert(canonical.clone());
        self.stack.push(canonical);
        let result = self.read_lines(&text, &origin, path.parent());
        self.stack.pop();
        result
    }

    fn read_lines(
        &mut self,
        text: &str,
        origin: &str,
        base_dir: Option<&Path>,
    ) -> Result<Vec<SourceLine>, ManifestError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let number = index + 1;
            let line = parser::parse_line(raw)
                .map_err(|message| ManifestError::parse(origin, number, raw.trim(), message))?;

            match &line {
                Line::Requirement(entry) => self.push(entry.clone(), origin, number)?,
                Line::Include { path, .. } => {
                    let base = base_dir.ok_or_else(|| {
                        ManifestError::parse(
                            origin,
                            number,
                            raw.trim(),
                            "include directives need a file-backed manifest",
                        )
                    })?;
                    self.include(&base.join(path), origin, number, raw.trim())?;
                }
                Line::Blank | Line::Comment(_) => {}
            }

            lines.push(SourceLine { number, line });
        }

        Ok(lines)
    }

    fn include(
        &mut self,
        target: &Path,
        origin: &str,
        number: usize,
        raw: &str,
    ) -> Result<(), ManifestError> {
        let canonical = target.canonicalize().map_err(|e| {
            ManifestError::parse(
                origin,
                number,
                raw,
                format!("cannot open included file '{}': {}", target.display(), e),
            )
        })?;

        if self.stack.contains(&canonical) {
            return Err(ManifestError::parse(
                origin,
                number,
                raw,
                format!("include cycle through '{}'", target.display()),
            ));
        }
        if self.loaded.contains(&canonical) {
            debug!(include = %target.display(), "already loaded, skipping");
            return Ok(());
        }

        debug!(include = %target.display(), from = origin, line = number, "following include");
        self.load_file(target)?;
        Ok(())
    }

    fn push(&mut self, entry: DependencyEntry, origin: &str, line: usize) -> Result<(), ManifestError> {
        let key = entry.normalized_name();
        if let Some((first_origin, first_line)) = self.seen.get(&key) {
            return Err(ManifestError::DuplicateDependency {
                origin: origin.to_string(),
                name: entry.name,
                line,
                first_origin: first_origin.clone(),
                first_line: *first_line,
            });
        }
        self.seen.insert(key, (origin.to_string(), line));
        self.entries.push(Located {
            entry,
            origin: origin.to_string(),
            line,
        });
        Ok(())
    }
}
