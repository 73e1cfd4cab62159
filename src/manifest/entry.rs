//! A single declared dependency

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::version::Constraint;

/// One `name[extras]<constraint>; marker  # comment` line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<String>,
    pub constraint: Option<Constraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    pub comment: Option<String>,
}

impl DependencyEntry {
    /// Entry with a name and nothing else
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extras: Vec::new(),
            constraint: None,
            marker: None,
            comment: None,
        }
    }

    /// Name used for uniqueness and lookups
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

impl fmt::Display for DependencyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(ref constraint) = self.constraint {
            write!(f, "{}", constraint)?;
        }
        if let Some(ref marker) = self.marker {
            write!(f, "; {}", marker)?;
        }
        if let Some(ref comment) = self.comment {
            write!(f, "  # {}", comment)?;
        }
        Ok(())
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("valid name pattern")
    })
}

fn separator_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-_.]+").expect("valid separator pattern"))
}

/// Whether `name` is a well-formed package name
pub fn is_valid_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

/// Lower-case and collapse `-`, `_`, `.` runs, so "Foo_Bar" and "foo-bar" collide
pub fn normalize_name(name: &str) -> String {
    separator_run().replace_all(name, "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("pytest"));
        assert!(is_valid_name("pytest-xdist"));
        assert!(is_valid_name("zope.interface"));
        assert!(is_valid_name("a"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("-pytest"));
        assert!(!is_valid_name("pytest-"));
        assert!(!is_valid_name("my package"));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Foo_Bar"), "foo-bar");
        assert_eq!(normalize_name("foo.-_bar"), "foo-bar");
        assert_eq!(normalize_name("Requests"), "requests");
    }

    #[test]
    fn test_display() {
        let mut entry = DependencyEntry::new("requests");
        entry.extras = vec!["socks".to_string()];
        entry.constraint = Some(Constraint::parse(">=2.31.0").unwrap());
        entry.marker = Some("python_version >= \"3.8\"".to_string());
        entry.comment = Some("HTTP client".to_string());
        assert_eq!(
            entry.to_string(),
            "requests[socks]>=2.31.0; python_version >= \"3.8\"  # HTTP client"
        );
    }
}
