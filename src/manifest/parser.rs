//! Line grammar for requirement manifests
//!
//! ```text
//! # comment
//! name[extra1,extra2]>=1.0,<2.0; python_version < "3.12"  # trailing comment
//! -r other-requirements.txt
//! ```
//!
//! Each physical line is parsed on its own; there is no quoting, escaping
//! or continuation.

use super::entry::{is_valid_name, DependencyEntry};
use crate::version::Constraint;

/// What a single physical line contains
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Blank,
    /// Whole-line comment, kept verbatim (trimmed)
    Comment(String),
    Requirement(DependencyEntry),
    /// `-r <path>` include directive
    Include {
        path: String,
        comment: Option<String>,
    },
}

/// Parse one line. The error is a human-readable reason; the caller adds
/// origin and line number.
pub fn parse_line(raw: &str) -> Result<Line, String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Ok(Line::Blank);
    }
    if trimmed.starts_with('#') {
        return Ok(Line::Comment(trimmed.to_string()));
    }

    let (body, comment) = split_comment(trimmed);
    let body = body.trim();

    if body.ends_with('\\') {
        return Err("line continuations are not supported".to_string());
    }

    if body.starts_with('-') {
        let path = parse_include(body)?;
        return Ok(Line::Include { path, comment });
    }

    let (requirement, marker) = match body.split_once(';') {
        Some((req, marker)) => {
            let marker = marker.trim();
            if marker.is_empty() {
                return Err("empty environment marker after ';'".to_string());
            }
            (req.trim(), Some(marker.to_string()))
        }
        None => (body, None),
    };

    let name_len = requirement
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        .unwrap_or(requirement.len());
    let name = &requirement[..name_len];
    if name.is_empty() {
        return Err("missing package name".to_string());
    }
    if !is_valid_name(name) {
        return Err(format!("'{}' is not a valid package name", name));
    }

    let mut rest = requirement[name_len..].trim_start();

    let mut extras = Vec::new();
    if let Some(after_bracket) = rest.strip_prefix('[') {
        let (list, after) = after_bracket
            .split_once(']')
            .ok_or_else(|| "unclosed '[' in extras".to_string())?;
        for extra in list.split(',').map(str::trim) {
            if !is_valid_name(extra) {
                return Err(format!("'{}' is not a valid extra name", extra));
            }
            extras.push(extra.to_string());
        }
        rest = after.trim_start();
    }

    let constraint = if rest.is_empty() {
        None
    } else if Constraint::starts_with_operator(rest) {
        Some(Constraint::parse(rest).map_err(|e| format!("{:#}", e))?)
    } else {
        return Err(format!("unexpected '{}' after package name '{}'", rest, name));
    };

    Ok(Line::Requirement(DependencyEntry {
        name: name.to_string(),
        extras,
        constraint,
        marker,
        comment,
    }))
}

/// Split at the first `#` preceded by whitespace
fn split_comment(line: &str) -> (&str, Option<String>) {
    let mut prev_is_space = false;
    for (i, c) in line.char_indices() {
        if c == '#' && prev_is_space {
            let text = line[i + 1..].trim();
            let comment = (!text.is_empty()).then(|| text.to_string());
            return (&line[..i], comment);
        }
        prev_is_space = c.is_whitespace();
    }
    (line, None)
}

/// Parse `-r path`, `-rpath`, `--requirement path` or `--requirement=path`
fn parse_include(body: &str) -> Result<String, String> {
    let path = if let Some(rest) = body.strip_prefix("--requirement") {
        rest.strip_prefix('=').unwrap_or(rest)
    } else if let Some(rest) = body.strip_prefix("-r") {
        rest
    } else {
        let option = body.split_whitespace().next().unwrap_or(body);
        return Err(format!("unsupported option '{}'", option));
    };

    // "--requirementsfoo" is not an include
    if body.starts_with("--requirement")
        && !path.is_empty()
        && !body.starts_with("--requirement=")
        && !path.starts_with(char::is_whitespace)
    {
        let option = body.split_whitespace().next().unwrap_or(body);
        return Err(format!("unsupported option '{}'", option));
    }

    let path = path.trim();
    if path.is_empty() {
        return Err("missing path after include option".to_string());
    }
    Ok(path.to_string())
}
