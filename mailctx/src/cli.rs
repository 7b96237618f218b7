// mailctx/src/cli.rs
//! This file defines the command-line interface (CLI) for the mailctx application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "mailctx",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Preview sanitized client branding for identity-provider emails",
    long_about = "mailctx runs template data through the same enrichment pipeline the email provider uses: directive syntax is stripped, client attributes are reduced to the logo and display-name whitelist, and unsafe logo URLs are dropped. Use it to see exactly what a template will receive for a given client.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `mailctx` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Builds the context a template would receive and prints it as JSON.
    #[command(about = "Builds the context a template would receive and prints it as JSON.")]
    Preview(PreviewCommand),

    /// Checks whether a URL is acceptable as a client logo.
    #[command(name = "check-url", about = "Checks whether a URL is acceptable as a client logo.")]
    CheckUrl(CheckUrlCommand),

    /// Sanitizes a string for template rendering.
    #[command(about = "Sanitizes a string for template rendering.")]
    Sanitize(SanitizeCommand),
}

/// Arguments for the `preview` command.
#[derive(Parser, Debug)]
pub struct PreviewCommand {
    /// JSON object holding the template data (reads from stdin if not provided).
    #[arg(long, value_name = "FILE", help = "Read template data (a JSON object) from a file instead of stdin.")]
    pub data: Option<PathBuf>,

    /// YAML file describing the realm and its clients.
    #[arg(long, value_name = "FILE", help = "Load the realm's clients from a YAML file.")]
    pub realm: Option<PathBuf>,

    #[arg(long, short = 't', value_name = "ID", default_value = "email-verification.ftl", help = "Template identifier.")]
    pub template: String,

    #[arg(long, short = 's', value_name = "TEXT", default_value = "", help = "Email subject.")]
    pub subject: String,

    /// Preview a send to explicit recipients instead of the session user.
    #[arg(long = "to", value_name = "ADDRESS", help = "Recipient address; repeat for several.")]
    pub to: Vec<String>,

    /// Path to a custom sanitizer configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", env = "MAILCTX_SANITIZER_CONFIG", help = "Path to a custom sanitizer configuration file (YAML).")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `check-url` command.
#[derive(Parser, Debug)]
pub struct CheckUrlCommand {
    #[arg(value_name = "URL")]
    pub url: String,

    #[arg(long = "config", value_name = "FILE", env = "MAILCTX_SANITIZER_CONFIG", help = "Path to a custom sanitizer configuration file (YAML).")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `sanitize` command.
#[derive(Parser, Debug)]
pub struct SanitizeCommand {
    /// Text to sanitize (reads from stdin if not provided).
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    #[arg(long = "config", value_name = "FILE", env = "MAILCTX_SANITIZER_CONFIG", help = "Path to a custom sanitizer configuration file (YAML).")]
    pub config: Option<PathBuf>,
}
