//! reqcheck - a checker for requirement manifests
//!
//! Loads line-oriented dependency manifests (`requirements.txt` and friends),
//! reports malformed lines and duplicate declarations with file and line,
//! and verifies installed packages against the declared constraints.
//!
//! ## Architecture
//!
//! ```text
//! cli → commands/ → manifest/ (parser, loader) → version (constraints)
//! ```
//!
//! ```no_run
//! use std::path::Path;
//! use reqcheck::manifest::Manifest;
//!
//! let manifest = Manifest::load(Path::new("requirements.txt"))?;
//! for entry in manifest.entries() {
//!     println!("{}", entry);
//! }
//! # Ok::<(), reqcheck::error::ManifestError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod installed;
pub mod manifest;
pub mod utils;
pub mod version;
