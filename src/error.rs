//! Error types and helpers for user-friendly error messages
//!
//! Every manifest failure carries the origin (usually the file path) and the
//! line it happened on, plus a hint on how to fix it.

use thiserror::Error;

/// Errors raised while loading, validating or verifying a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// A line does not match the requirement grammar
    #[error("{origin}:{line}: invalid requirement '{content}': {message}")]
    Parse {
        origin: String,
        line: usize,
        content: String,
        message: String,
    },

    /// The same (normalized) package name is declared twice
    #[error("{origin}:{line}: duplicate dependency '{name}' (first declared at {first_origin}:{first_line})")]
    DuplicateDependency {
        origin: String,
        name: String,
        line: usize,
        first_origin: String,
        first_line: usize,
    },

    /// No available version satisfies the declared constraint
    #[error("{origin}:{line}: unresolvable constraint for '{name}': {reason}")]
    UnresolvableConstraint {
        origin: String,
        line: usize,
        name: String,
        constraint: Option<String>,
        reason: String,
    },

    /// The manifest could not be read
    #[error("Failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },
}

impl ManifestError {
    /// Create a parse error for a line
    pub fn parse(
        origin: impl Into<String>,
        line: usize,
        content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            origin: origin.into(),
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Line number the error points at, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ManifestError::Parse { line, .. }
            | ManifestError::DuplicateDependency { line, .. }
            | ManifestError::UnresolvableConstraint { line, .. } => Some(*line),
            ManifestError::Io { .. } | ManifestError::Config { .. } => None,
        }
    }

    /// Actionable hint for this error
    pub fn hint(&self) -> Option<String> {
        match self {
            ManifestError::Parse { .. } => Some(hints::requirement_syntax().to_string()),
            ManifestError::DuplicateDependency { name, .. } => Some(format!(
                "Declare '{}' once and merge its constraints with ',' (e.g. 'pkg>=1.0,<2.0').\n\
                 Names are compared case-insensitively, with '-', '_' and '.' treated alike.",
                name
            )),
            ManifestError::UnresolvableConstraint { name, constraint, .. } => Some(match constraint {
                Some(c) => format!("Install a version of '{}' matching '{}', or relax the constraint.", name, c),
                None => format!("Install '{}' into the environment.", name),
            }),
            ManifestError::Io { source, .. } => Some(
                match source.kind() {
                    std::io::ErrorKind::InvalidData => hints::manifest_encoding(),
                    std::io::ErrorKind::PermissionDenied => hints::manifest_permissions(),
                    _ => hints::manifest_not_found(),
                }
                .to_string(),
            ),
            ManifestError::Config { hint, .. } => hint.clone(),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        self.display_with_context(&[]);
    }

    /// Like [`display_with_hints`](Self::display_with_hints), prefixed by the
    /// context messages the error was wrapped in (outermost first)
    pub fn display_with_context(&self, context: &[String]) {
        use console::style;

        let mut message = String::new();
        for layer in context {
            message.push_str(layer);
            message.push_str(": ");
        }
        eprintln!("\n{} {}{}", style("ERROR:").red().bold(), message, self);

        if let ManifestError::Config { source: Some(source), .. } = self {
            eprintln!("  {} {:#}", style("caused by:").dim(), source);
        }

        if let Some(h) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
        }

        eprintln!();
    }
}

/// Print an application error, with hints when it wraps a [`ManifestError`]
pub fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ManifestError>() {
        Some(manifest_err) => manifest_err.display_with_context(&context_of(err)),
        None => crate::utils::terminal::print_error(&format!("{:#}", err)),
    }
}

/// Context messages layered above the first `ManifestError` in the chain
pub fn context_of(err: &anyhow::Error) -> Vec<String> {
    err.chain()
        .take_while(|cause| !cause.is::<ManifestError>())
        .map(|cause| cause.to_string())
        .collect()
}

/// Common error hints
pub mod hints {
    /// Hint for malformed requirement lines
    pub fn requirement_syntax() -> &'static str {
        "Each line must look like:\n\
         • name\n\
         • name>=1.2.3\n\
         • name[extra]>=1.0,<2.0; python_version < \"3.12\"  # why it is needed\n\
         \n\
         Operators: ==, !=, >=, <=, >, <, ~= (wildcards allowed with == and !=)"
    }

    /// Hint for a manifest that cannot be read
    pub fn manifest_not_found() -> &'static str {
        "Check the path, or pass the manifest explicitly:\n\
         • reqcheck check path/to/requirements.txt\n\
         • reqcheck check --recursive ."
    }

    /// Hint for a manifest that is not UTF-8 text
    pub fn manifest_encoding() -> &'static str {
        "The manifest is not valid UTF-8. Re-save it as UTF-8 text\n\
         (a leading byte-order mark is accepted)."
    }

    /// Hint for a manifest the current user may not read
    pub fn manifest_permissions() -> &'static str {
        "Check that the file is readable by the current user."
    }

    /// Hint for an invalid reqcheck.toml
    pub fn invalid_config() -> &'static str {
        "reqcheck.toml is invalid. Common issues:\n\
         • Invalid TOML syntax (check quotes, brackets)\n\
         • Unknown section or key (allowed: [check], [format])\n\
         • Invalid glob in check.pattern"
    }
}
