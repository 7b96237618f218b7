// mailctx/src/commands/check_url.rs
//! `mailctx check-url`: applies the logo URL policy to a single URL.

use anyhow::{bail, Result};
use log::debug;

use mailctx_core::rejection::log_excerpt;
use mailctx_core::TemplateSanitizer;

use crate::cli::CheckUrlCommand;
use crate::commands::load_sanitizer;

/// Prints the cleaned URL, or fails when the URL would be dropped from a template.
pub fn handle_check_url(cmd: &CheckUrlCommand) -> Result<()> {
    let sanitizer = load_sanitizer(cmd.config.as_deref())?;
    debug!("Checking URL of {} characters.", cmd.url.chars().count());

    match sanitizer.sanitize_url(Some(&cmd.url)) {
        Some(clean) => {
            println!("{}", clean);
            Ok(())
        }
        None => bail!(
            "URL rejected: '{}'",
            log_excerpt(&cmd.url, sanitizer.config().log_excerpt_length)
        ),
    }
}
