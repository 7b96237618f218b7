//! errors.rs - Custom error types for the mailctx-core library.
//!
//! Enrichment itself never fails outward; these errors cover configuration,
//! pattern compilation, provider construction and the delegate's own delivery
//! failures, which are propagated unchanged.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `mailctx-core` library.
///
/// `#[non_exhaustive]` lets new variants be added without breaking callers
/// that match on it.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MailCtxError {
    #[error("Failed to compile directive pattern '{0}': {1}")]
    PatternCompilationError(String, regex::Error),

    #[error("Pattern '{0}': length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Invalid sanitizer configuration: {0}")]
    InvalidConfig(String),

    #[error("Default email template provider '{0}' is not available")]
    DelegateUnavailable(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}
