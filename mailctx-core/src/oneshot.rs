// File: mailctx-core/src/oneshot.rs
//! Convenience wrappers around a process-wide sanitizer built from the default
//! configuration. The compiled patterns are initialized once and never change.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::config::SanitizerConfig;
use crate::engine::TemplateSanitizer;
use crate::engines::regex_engine::RegexSanitizer;

static DEFAULT_SANITIZER: Lazy<Arc<RegexSanitizer>> = Lazy::new(|| {
    Arc::new(
        RegexSanitizer::new(SanitizerConfig::default())
            .expect("built-in FreeMarker directive patterns compile"),
    )
});

/// The default sanitizer (FreeMarker syntax, 500/2048 character ceilings).
pub fn default_sanitizer() -> &'static RegexSanitizer {
    &**DEFAULT_SANITIZER
}

/// A shared handle to the default sanitizer, for components that hold one.
pub fn shared_default_sanitizer() -> Arc<dyn TemplateSanitizer> {
    let shared: Arc<RegexSanitizer> = Arc::clone(&DEFAULT_SANITIZER);
    shared
}

/// Sanitizes a string for template rendering with the default sanitizer.
pub fn sanitize_for_template(value: Option<&str>) -> Option<String> {
    default_sanitizer().sanitize_for_template(value)
}

/// Validates and cleans a URL with the default sanitizer; `None` means reject.
pub fn sanitize_url(value: Option<&str>) -> Option<String> {
    default_sanitizer().sanitize_url(value)
}
