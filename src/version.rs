//! Version parsing and constraint matching
//!
//! Supports the constraint operators found in requirement manifests:
//! - Exact: "==1.2.3", with prefix wildcard "==1.2.*"
//! - Exclusion: "!=1.2.3" or "!=1.2.*"
//! - Greater/Less: ">=1.0", "<2.0", ">1.0", "<=1.9.9"
//! - Compatible release: "~=1.4.5" (>= 1.4.5, == 1.4.*)
//! - Range: ">=1.2.0, <1.8.0"

use anyhow::{bail, Context, Result};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

const SEPARATORS: &[char] = &['.', '-', '_'];

/// Pre-release phase, in ascending precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreKind {
    Alpha,
    Beta,
    Rc,
}

impl PreKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "a" | "alpha" => Some(PreKind::Alpha),
            "b" | "beta" => Some(PreKind::Beta),
            "rc" | "c" | "pre" | "preview" => Some(PreKind::Rc),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            PreKind::Alpha => "a",
            PreKind::Beta => "b",
            PreKind::Rc => "rc",
        }
    }
}

/// A package version (release segments plus optional qualifiers)
#[derive(Debug, Clone)]
pub struct Version {
    pub release: Vec<u64>,
    pub pre: Option<(PreKind, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Vec<String>,
}

impl Version {
    /// Parse a version string like "1.2.3", "2.0rc1" or "1.0.0-alpha.1"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Empty version");
        }

        // Split local segments (e.g., "2.0.0+cu118")
        let (public, local) = match s.split_once('+') {
            Some((p, l)) => {
                let segments: Vec<String> = l.split('.').map(|s| s.to_ascii_lowercase()).collect();
                if segments
                    .iter()
                    .any(|seg| seg.is_empty() || !seg.chars().all(|c| c.is_ascii_alphanumeric()))
                {
                    bail!("Invalid local version label: '{}'", l);
                }
                (p, segments)
            }
            None => (s, vec![]),
        };

        let lower = public.to_ascii_lowercase();
        let body = lower.strip_prefix('v').unwrap_or(&lower);

        // Leading release segments: digits separated by dots
        let release_end = body
            .char_indices()
            .find(|&(i, c)| {
                !(c.is_ascii_digit()
                    || (c == '.' && body[i + 1..].starts_with(|n: char| n.is_ascii_digit())))
            })
            .map(|(i, _)| i)
            .unwrap_or(body.len());

        let release_str = &body[..release_end];
        if release_str.is_empty() {
            bail!("Invalid version format: '{}'. Expected digits like '1.2.3'", s);
        }
        let release = release_str
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .with_context(|| format!("Invalid release segment: '{}'", part))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut version = Version {
            release,
            pre: None,
            post: None,
            dev: None,
            local,
        };
        version.parse_qualifiers(&body[release_end..], s)?;
        Ok(version)
    }

    /// Parse the pre/post/dev suffix that follows the release segments
    fn parse_qualifiers(&mut self, mut rest: &str, original: &str) -> Result<()> {
        while !rest.is_empty() {
            let trimmed = rest.trim_start_matches(SEPARATORS);
            let tag_len = trimmed
                .find(|c: char| !c.is_ascii_alphabetic())
                .unwrap_or(trimmed.len());
            let (tag, after_tag) = trimmed.split_at(tag_len);
            let after_sep = after_tag.trim_start_matches(SEPARATORS);
            let digits_len = after_sep
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_sep.len());
            let number = if digits_len == 0 {
                0
            } else {
                after_sep[..digits_len].parse::<u64>().with_context(|| {
                    format!("Invalid number in version '{}'", original)
                })?
            };
            let consumed = if digits_len == 0 { after_tag } else { &after_sep[digits_len..] };

            if tag.is_empty() {
                bail!("Invalid version format: '{}'", original);
            }

            if let Some(kind) = PreKind::from_tag(tag) {
                if self.pre.is_some() || self.post.is_some() || self.dev.is_some() {
                    bail!("Misplaced pre-release tag in version '{}'", original);
                }
                self.pre = Some((kind, number));
            } else if matches!(tag, "post" | "rev" | "r") {
                if self.post.is_some() || self.dev.is_some() {
                    bail!("Misplaced post-release tag in version '{}'", original);
                }
                self.post = Some(number);
            } else if tag == "dev" {
                if self.dev.is_some() {
                    bail!("Duplicate dev tag in version '{}'", original);
                }
                self.dev = Some(number);
            } else {
                bail!("Unknown version qualifier '{}' in '{}'", tag, original);
            }
            rest = consumed;
        }
        Ok(())
    }

    /// Whether this is a pre-release or development release
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release segment at `index`, zero past the end
    fn release_at(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    /// Check if this version matches a constraint
    pub fn matches(&self, req: &Constraint) -> bool {
        req.matches(self)
    }

    /// Ordering key for the pre-release phase:
    /// dev-only < pre-release < final/post
    fn phase_key(&self) -> (u8, Option<(PreKind, u64)>) {
        match (self.pre, self.post, self.dev) {
            (Some(pre), _, _) => (1, Some(pre)),
            (None, None, Some(_)) => (0, None),
            _ => (2, None),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let release: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((kind, n)) = self.pre {
            write!(f, "{}{}", kind.as_str(), n)?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        if !self.local.is_empty() {
            write!(f, "+{}", self.local.join("."))?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Release segments compare as if zero-padded: 1.0 == 1.0.0
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            match self.release_at(i).cmp(&other.release_at(i)) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        match self.phase_key().cmp(&other.phase_key()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // None < Some for post releases
        match self.post.cmp(&other.post) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // A dev release sorts before the same version without one
        match (self.dev, other.dev) {
            (Some(a), Some(b)) => match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            },
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => {}
        }

        cmp_local(&self.local, &other.local)
    }
}

/// Local labels compare segment by segment: numeric segments by value and
/// after alphanumeric ones, a longer label after its own prefix
fn cmp_local(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(m), Ok(n)) => m.cmp(&n),
            (Ok(_), Err(_)) => Ordering::Greater,
            (Err(_), Ok(_)) => Ordering::Less,
            (Err(_), Err(_)) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// A version constraint: every comparator must match
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    comparators: Vec<Comparator>,
}

/// A single `<op><version>` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    pub op: Op,
    pub version: Version,
    /// Trailing `.*` on `==` / `!=`
    pub wildcard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,      // ==1.2.3
    NotEqual,   // !=1.2.3
    Greater,    // >1.2.3
    GreaterEq,  // >=1.2.3
    Less,       // <1.2.3
    LessEq,     // <=1.2.3
    Compatible, // ~=1.2.3
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Exact => "==",
            Op::NotEqual => "!=",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
            Op::Less => "<",
            Op::LessEq => "<=",
            Op::Compatible => "~=",
        }
    }
}

/// Operator prefixes, longest first so ">=" wins over ">"
const OPERATORS: &[(&str, Op)] = &[
    ("==", Op::Exact),
    ("!=", Op::NotEqual),
    (">=", Op::GreaterEq),
    ("<=", Op::LessEq),
    ("~=", Op::Compatible),
    (">", Op::Greater),
    ("<", Op::Less),
];

impl Constraint {
    /// Parse a constraint string like ">=1.2, <2.0"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() {
            bail!("Empty version constraint");
        }

        let comparators = s
            .split(',')
            .map(|part| Self::parse_single(part.trim()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Constraint { comparators })
    }

    /// Whether `s` begins with a constraint operator
    pub fn starts_with_operator(s: &str) -> bool {
        s.starts_with("===") || OPERATORS.iter().any(|(prefix, _)| s.starts_with(prefix))
    }

    /// Parse a single comparator (no commas)
    fn parse_single(s: &str) -> Result<Comparator> {
        if s.is_empty() {
            bail!("Empty comparator in version constraint");
        }
        if s.starts_with("===") {
            bail!("Arbitrary equality '===' is not supported");
        }

        let (op, version_str) = OPERATORS
            .iter()
            .find_map(|(prefix, op)| s.strip_prefix(prefix).map(|rest| (*op, rest.trim())))
            .with_context(|| format!("Missing comparison operator in '{}'", s))?;

        if version_str.is_empty() {
            bail!("Missing version after '{}'", op.as_str());
        }

        let (version_str, wildcard) = match version_str.strip_suffix(".*") {
            Some(prefix) => {
                if !matches!(op, Op::Exact | Op::NotEqual) {
                    bail!("Wildcard versions are only allowed with '==' and '!='");
                }
                (prefix, true)
            }
            None => (version_str, false),
        };

        let version = Version::parse(version_str)
            .with_context(|| format!("Invalid version '{}' after '{}'", version_str, op.as_str()))?;

        if wildcard && (version.pre.is_some() || version.post.is_some() || version.dev.is_some() || !version.local.is_empty()) {
            bail!("Wildcard versions must be plain release numbers: '{}.*'", version_str);
        }
        if op == Op::Compatible && version.release.len() < 2 {
            bail!("'~=' needs at least two release segments, got '{}'", version_str);
        }

        Ok(Comparator { op, version, wildcard })
    }

    /// Comparators in declaration order
    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    /// The pinned version when the constraint is a single exact `==`
    pub fn pinned_version(&self) -> Option<&Version> {
        match self.comparators.as_slice() {
            [Comparator { op: Op::Exact, version, wildcard: false }] => Some(version),
            _ => None,
        }
    }

    /// Check if a version satisfies this constraint
    pub fn matches(&self, version: &Version) -> bool {
        self.allows(version, false)
    }

    /// Check a version, optionally accepting pre-releases the constraint
    /// does not mention (e.g. one that is already installed)
    pub fn allows(&self, version: &Version, prereleases: bool) -> bool {
        // Pre-releases only satisfy constraints that mention one
        if !prereleases
            && version.is_prerelease()
            && !self.comparators.iter().any(|c| c.version.is_prerelease())
        {
            return false;
        }
        self.comparators.iter().all(|c| c.matches(version))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.comparators.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Comparator {
    /// Check if a version matches this comparator
    fn matches(&self, version: &Version) -> bool {
        match self.op {
            Op::Exact if self.wildcard => self.matches_prefix(version, self.version.release.len()),
            Op::Exact => version == &self.version,
            Op::NotEqual if self.wildcard => !self.matches_prefix(version, self.version.release.len()),
            Op::NotEqual => version != &self.version,
            Op::Greater => version > &self.version,
            Op::GreaterEq => version >= &self.version,
            Op::Less => version < &self.version,
            Op::LessEq => version <= &self.version,
            Op::Compatible => self.matches_compatible(version),
        }
    }

    /// Release prefix match on the first `len` segments
    fn matches_prefix(&self, version: &Version, len: usize) -> bool {
        (0..len).all(|i| version.release_at(i) == self.version.release_at(i))
    }

    /// Compatible release: ~=1.4.5 allows >=1.4.5, ==1.4.*
    fn matches_compatible(&self, version: &Version) -> bool {
        version >= &self.version && self.matches_prefix(version, self.version.release.len() - 1)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)?;
        if self.wildcard {
            write!(f, ".*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse() {
        let ver = v("1.2.3");
        assert_eq!(ver.release, vec![1, 2, 3]);
        assert!(ver.pre.is_none());

        let ver = v("2.0rc1");
        assert_eq!(ver.release, vec![2, 0]);
        assert_eq!(ver.pre, Some((PreKind::Rc, 1)));

        let ver = v("1.0.0-alpha.1");
        assert_eq!(ver.pre, Some((PreKind::Alpha, 1)));

        let ver = v("1.4.post2.dev3+cu118");
        assert_eq!(ver.post, Some(2));
        assert_eq!(ver.dev, Some(3));
        assert_eq!(ver.local, vec!["cu118"]);
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse(">7.4.2").is_err());
        assert!(Version::parse("1..2").is_err());
        assert!(Version::parse("1.2.foo").is_err());
        assert!(Version::parse("1.0+").is_err());
    }

    #[test]
    fn test_version_comparison() {
        assert!(v("1.2.3") < v("1.2.4"));
        assert!(v("1.2.4") < v("1.3.0"));
        assert_eq!(v("1.0"), v("1.0.0"));
        assert!(v("1.0.dev1") < v("1.0a1"));
        assert!(v("1.0a1") < v("1.0b1"));
        assert!(v("1.0b1") < v("1.0rc1"));
        assert!(v("1.0rc1") < v("1.0"));
        assert!(v("1.0") < v("1.0.post1"));
        assert!(v("1.0a1.dev1") < v("1.0a1"));
        assert!(v("1.0") < v("1.0+local"));
    }

    #[test]
    fn test_local_segments_compare_numerically() {
        assert!(v("1.0+9") < v("1.0+10"));
        assert!(v("1.0+abc") < v("1.0+9"));
        assert!(v("1.0+cu118") < v("1.0+cu121"));
        assert!(v("1.0+ubuntu") < v("1.0+ubuntu.1"));
        assert_eq!(v("1.0+007"), v("1.0+7"));
    }

    #[test]
    fn test_version_display_reparses() {
        for s in ["1.2.3", "2.0rc1", "1.4.post2.dev3", "7.4", "2.0.0+cu118"] {
            let parsed = v(s);
            assert_eq!(v(&parsed.to_string()), parsed);
        }
        assert_eq!(v("V1.0-Alpha.2").to_string(), "1.0a2");
    }

    #[test]
    fn test_exact_version() {
        let req = Constraint::parse("==1.2.3").unwrap();
        assert!(req.matches(&v("1.2.3")));
        assert!(req.matches(&v("1.2.3.0")));
        assert!(!req.matches(&v("1.2.4")));
        assert_eq!(req.pinned_version(), Some(&v("1.2.3")));
    }

    #[test]
    fn test_wildcard_version() {
        let req = Constraint::parse("==1.*").unwrap();
        assert!(req.matches(&v("1.0.0")));
        assert!(req.matches(&v("1.9.9")));
        assert!(!req.matches(&v("2.0.0")));
        assert!(req.pinned_version().is_none());

        let req = Constraint::parse("!=1.2.*").unwrap();
        assert!(!req.matches(&v("1.2.0")));
        assert!(req.matches(&v("1.3.0")));

        assert!(Constraint::parse(">=1.*").is_err());
    }

    #[test]
    fn test_compatible_release() {
        let req = Constraint::parse("~=1.4.5").unwrap();
        assert!(req.matches(&v("1.4.5")));
        assert!(req.matches(&v("1.4.9")));
        assert!(!req.matches(&v("1.5.0")));
        assert!(!req.matches(&v("1.4.4")));

        let req = Constraint::parse("~=2.2").unwrap();
        assert!(req.matches(&v("2.9")));
        assert!(!req.matches(&v("3.0")));

        assert!(Constraint::parse("~=1").is_err());
    }

    #[test]
    fn test_range_version() {
        let req = Constraint::parse(">=1.2.0, <1.8.0").unwrap();
        assert!(!req.matches(&v("1.1.9")));
        assert!(req.matches(&v("1.2.0")));
        assert!(req.matches(&v("1.5.0")));
        assert!(!req.matches(&v("1.8.0")));
        assert_eq!(req.to_string(), ">=1.2.0,<1.8.0");
    }

    #[test]
    fn test_greater_less() {
        let req = Constraint::parse(">1.0.0").unwrap();
        assert!(!req.matches(&v("1.0.0")));
        assert!(req.matches(&v("1.0.1")));

        let req = Constraint::parse("<2.0.0").unwrap();
        assert!(req.matches(&v("1.9.9")));
        assert!(!req.matches(&v("2.0.0")));
    }

    #[test]
    fn test_prereleases_need_opt_in() {
        let req = Constraint::parse(">=1.0").unwrap();
        assert!(!req.matches(&v("2.0b1")));

        let req = Constraint::parse(">=2.0b1").unwrap();
        assert!(req.matches(&v("2.0b2")));

        let req = Constraint::parse(">=1.0").unwrap();
        assert!(req.allows(&v("2.0b1"), true));
        assert!(!req.allows(&v("0.9b1"), true));
    }

    #[test]
    fn test_malformed_constraints() {
        assert!(Constraint::parse("").is_err());
        assert!(Constraint::parse(">=>7.4.2").is_err());
        assert!(Constraint::parse(">=").is_err());
        assert!(Constraint::parse("1.2.3").is_err());
        assert!(Constraint::parse("===1.0").is_err());
        assert!(Constraint::parse(">=1.0,").is_err());
    }
}
