//! Manifest path resolution and discovery

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

/// Directories never worth descending into
const SKIPPED_DIRS: &[&str] = &[".git", ".hg", ".venv", "venv", "node_modules", "target", "__pycache__"];

/// Expand command-line paths into manifest files.
///
/// Files are kept as given. Directories are only accepted with `recursive`,
/// in which case every file below them whose name matches `pattern` is
/// returned, sorted for stable output.
pub fn collect_manifests(paths: &[PathBuf], pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let matcher = glob::Pattern::new(pattern)
        .with_context(|| format!("Invalid manifest pattern '{}'", pattern))?;
    let mut manifests = Vec::new();

    for path in paths {
        if !path.is_dir() {
            manifests.push(path.clone());
            continue;
        }
        if !recursive {
            bail!("{} is a directory (use --recursive to search it)", path.display());
        }

        let mut found = discover(path, &matcher)?;
        if found.is_empty() {
            tracing::warn!(dir = %path.display(), pattern, "no manifests found");
        }
        manifests.append(&mut found);
    }

    let mut seen = HashSet::new();
    manifests.retain(|path| seen.insert(path.clone()));
    Ok(manifests)
}

/// Walk `root` for files whose name matches `matcher`
fn discover(root: &Path, matcher: &glob::Pattern) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| SKIPPED_DIRS.contains(&name))
        });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file() && matcher.matches(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_files_pass_through() {
        let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")];
        assert_eq!(collect_manifests(&paths, "requirements*.txt", false).unwrap(), paths);
    }

    #[test]
    fn test_repeated_paths_checked_once() {
        let paths = vec![PathBuf::from("a.txt"), PathBuf::from("b.txt"), PathBuf::from("a.txt")];
        assert_eq!(
            collect_manifests(&paths, "requirements*.txt", false).unwrap(),
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn test_directory_needs_recursive() {
        let temp = TempDir::new().unwrap();
        assert!(collect_manifests(&[temp.path().to_path_buf()], "requirements*.txt", false).is_err());
    }

    #[test]
    fn test_recursive_discovery() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("services/api")).unwrap();
        fs::create_dir_all(root.join(".venv/lib")).unwrap();
        fs::write(root.join("requirements.txt"), "").unwrap();
        fs::write(root.join("requirements-dev.txt"), "").unwrap();
        fs::write(root.join("services/api/requirements.txt"), "").unwrap();
        fs::write(root.join(".venv/lib/requirements.txt"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();

        let found = collect_manifests(&[root.to_path_buf()], "requirements*.txt", true).unwrap();
        let relative: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("requirements-dev.txt"),
                PathBuf::from("requirements.txt"),
                PathBuf::from("services/api/requirements.txt"),
            ]
        );
    }
}
