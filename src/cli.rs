//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{
    check::CheckCommand, fmt::FmtCommand, list::ListCommand, verify::VerifyCommand,
};
use crate::config::ReqcheckConfig;

/// reqcheck - requirement manifest checker
///
/// Validates, lists, formats and verifies line-oriented dependency manifests
/// such as requirements.txt.
#[derive(Parser, Debug)]
#[command(name = "reqcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (default: ./reqcheck.toml, then the user config dir)
    #[arg(long, global = true, env = "REQCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate manifests and report every problem
    Check(CheckCommand),

    /// Print the entries of a manifest
    List(ListCommand),

    /// Rewrite a manifest in canonical form
    Fmt(FmtCommand),

    /// Check installed packages against a manifest
    Verify(VerifyCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let config = ReqcheckConfig::load(self.config.as_deref())?;

        // Execute the subcommand
        match self.command {
            Commands::Check(cmd) => cmd.execute(&config),
            Commands::List(cmd) => cmd.execute(&config),
            Commands::Fmt(cmd) => cmd.execute(&config),
            Commands::Verify(cmd) => cmd.execute(&config),
        }
    }
}
