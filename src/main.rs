//! reqcheck CLI entry point

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use reqcheck::cli::Cli;
use reqcheck::error;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = cli.execute() {
        error::report(&err);
        std::process::exit(1);
    }
}

/// Log to stderr; RUST_LOG overrides the default level
fn init_logging(verbose: bool) {
    let level_filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
