// mailctx/src/main.rs
//! mailctx entry point.
//!
//! Parses the command line, configures logging and dispatches to the subcommand.

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use mailctx::cli::{Cli, Commands};
use mailctx::commands::{check_url, preview, sanitize};
use mailctx::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Some(LevelFilter::Off)
    } else if cli.debug {
        Some(LevelFilter::Debug)
    } else {
        None
    };
    logger::init_logger(level);

    match &cli.command {
        Commands::Preview(cmd) => preview::handle_preview(cmd),
        Commands::CheckUrl(cmd) => check_url::handle_check_url(cmd),
        Commands::Sanitize(cmd) => sanitize::handle_sanitize(cmd),
    }
}
