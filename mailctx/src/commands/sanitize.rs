// mailctx/src/commands/sanitize.rs
//! `mailctx sanitize`: strips directive syntax from a string the way template values are.

use anyhow::Result;
use mailctx_core::TemplateSanitizer;

use crate::cli::SanitizeCommand;
use crate::commands::{load_sanitizer, read_stdin};

pub fn handle_sanitize(cmd: &SanitizeCommand) -> Result<()> {
    let sanitizer = load_sanitizer(cmd.config.as_deref())?;
    let text = match &cmd.text {
        Some(text) => text.clone(),
        None => read_stdin("text")?,
    };

    let sanitized = sanitizer.sanitize_for_template(Some(&text)).unwrap_or_default();
    println!("{}", sanitized);
    Ok(())
}
