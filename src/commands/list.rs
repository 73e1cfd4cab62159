//! List command - print the entries of a manifest
//!
//! Usage:
//!   reqcheck list                       # text table
//!   reqcheck list dev.txt --format json # machine-readable

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use console::style;
use serde::Serialize;

use crate::config::ReqcheckConfig;
use crate::manifest::{DependencyEntry, Manifest};
use crate::utils::terminal::plural;

/// Output format for list command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Text format (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

/// List manifest entries
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Manifest to list (default: check.default_manifest)
    pub path: Option<PathBuf>,

    /// Output format: text, json
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Root structure for JSON output
#[derive(Serialize, Debug)]
struct ListJson<'a> {
    manifest: &'a str,
    entries: Vec<EntryJson<'a>>,
}

#[derive(Serialize, Debug)]
struct EntryJson<'a> {
    #[serde(flatten)]
    entry: &'a DependencyEntry,
    origin: &'a str,
    line: usize,
}

impl ListCommand {
    /// Execute the list command
    pub fn execute(self, config: &ReqcheckConfig) -> Result<()> {
        let path = self
            .path
            .unwrap_or_else(|| config.check.default_manifest.clone());
        let manifest = Manifest::load(&path)?;

        match self.format {
            OutputFormat::Text => print!("{}", render_text(&manifest)),
            OutputFormat::Json => println!("{}", render_json(&manifest)?),
        }
        Ok(())
    }
}

fn render_text(manifest: &Manifest) -> String {
    let names: Vec<String> = manifest.entries().map(display_name).collect();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);

    let mut out = format!(
        "{} ({})\n",
        style(manifest.origin()).bold(),
        plural(manifest.len(), "entry", "entries")
    );

    for (located, name) in manifest.located().iter().zip(&names) {
        let entry = &located.entry;
        let constraint = entry
            .constraint
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "*".to_string());

        out.push_str(&format!(
            "  {}  {}",
            style(format!("{:<width$}", name, width = width)).cyan(),
            constraint
        ));
        if let Some(ref marker) = entry.marker {
            out.push_str(&format!("  {}", style(format!("; {}", marker)).dim()));
        }
        if let Some(ref comment) = entry.comment {
            out.push_str(&format!("  {}", style(format!("# {}", comment)).dim()));
        }
        if located.origin != manifest.origin() {
            out.push_str(&format!(
                "  {}",
                style(format!("({}:{})", located.origin, located.line)).dim()
            ));
        }
        out.push('\n');
    }

    out
}

/// Name with extras, e.g. "requests[socks]"
fn display_name(entry: &DependencyEntry) -> String {
    if entry.extras.is_empty() {
        entry.name.clone()
    } else {
        format!("{}[{}]", entry.name, entry.extras.join(","))
    }
}

fn render_json(manifest: &Manifest) -> Result<String> {
    let json = ListJson {
        manifest: manifest.origin(),
        entries: manifest
            .located()
            .iter()
            .map(|l| EntryJson {
                entry: &l.entry,
                origin: &l.origin,
                line: l.line,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json() {
        let manifest = Manifest::parse_str(
            "# runner\npytest>=7.4.2  # test runner\nrequests[socks]\n",
            "requirements.txt",
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&render_json(&manifest).unwrap()).unwrap();

        assert_eq!(value["manifest"], "requirements.txt");
        let entries = value["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "pytest");
        assert_eq!(entries[0]["constraint"], ">=7.4.2");
        assert_eq!(entries[0]["comment"], "test runner");
        assert_eq!(entries[0]["line"], 2);
        assert_eq!(entries[1]["extras"][0], "socks");
        assert!(entries[1]["constraint"].is_null());
        assert!(entries[1].get("marker").is_none());
    }

    #[test]
    fn test_render_text() {
        console::set_colors_enabled(false);
        let manifest = Manifest::parse_str("pytest>=7.4.2\nfaker  # fixtures\n", "requirements.txt").unwrap();
        let text = render_text(&manifest);
        assert!(text.starts_with("requirements.txt (2 entries)\n"));
        assert!(text.contains("pytest  >=7.4.2"));
        assert!(text.contains("faker   *  # fixtures"));
    }
}
