// mailctx-core/src/engine.rs
//! Defines the core `TemplateSanitizer` trait.
//!
//! Directive syntax is specific to the downstream template engine, so the sanitizer
//! sits behind a trait: the context builder only needs "clean this string", "vet this
//! URL" and "which keys are engine internals", not the patterns that implement them.
//!
//! License: MIT OR APACHE 2.0

use crate::config::SanitizerConfig;

/// Pure string and URL cleansing for values headed into a template engine.
///
/// Implementations hold no mutable state and are safe to share across threads.
pub trait TemplateSanitizer: Send + Sync {
    /// Strips directive syntax, script blocks and inline event handlers, bounds the length
    /// and trims. `None` in gives `None` out; this never fails.
    fn sanitize_for_template(&self, value: Option<&str>) -> Option<String>;

    /// Returns the cleaned URL, or `None` when the URL must not be used.
    fn sanitize_url(&self, value: Option<&str>) -> Option<String>;

    /// `true` if the value carries a marker of directive syntax and should be sanitized
    /// before it is allowed into a template context.
    fn looks_suspicious(&self, value: &str) -> bool;

    /// Template data keys that name engine internals and must be dropped.
    fn reserved_keys(&self) -> &[String];

    /// Returns a reference to the sanitizer's configuration.
    fn config(&self) -> &SanitizerConfig;
}
