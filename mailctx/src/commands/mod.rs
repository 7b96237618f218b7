// mailctx/src/commands/mod.rs
//! Subcommand implementations.

pub mod check_url;
pub mod preview;
pub mod sanitize;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use mailctx_core::{shared_default_sanitizer, RegexSanitizer, SanitizerConfig, TemplateSanitizer};

/// Builds the sanitizer for a command: from `config` when given, the default otherwise.
pub fn load_sanitizer(config: Option<&Path>) -> Result<Arc<dyn TemplateSanitizer>> {
    let Some(path) = config else {
        return Ok(shared_default_sanitizer());
    };
    let config = SanitizerConfig::load_from_file(path)?;
    let sanitizer = RegexSanitizer::new(config)
        .with_context(|| format!("Failed to build sanitizer from {}", path.display()))?;
    Ok(Arc::new(sanitizer))
}

/// Reads all of stdin, refusing to block on an interactive terminal.
pub fn read_stdin(what: &str) -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        anyhow::bail!("No {} given. Pass it as an argument or pipe it on stdin.", what);
    }
    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .with_context(|| format!("Failed to read {} from stdin", what))?;
    Ok(buffer)
}
