//! Log-safe reporting of values the sanitizer refused or altered.
//!
//! Rejected values are attacker-controlled, so they never reach a log line in full.
//! A bounded excerpt shows what the value looked like, and a short SHA-256 fingerprint
//! of the complete value lets repeated rejections of the same input be correlated.

use log::warn;
use sha2::{Digest, Sha256};

use crate::validators::{char_len, truncate_chars, UrlRejection};

const FINGERPRINT_HEX_LEN: usize = 12;

/// The first `max_chars` characters of `value`, with an ellipsis when something was cut.
pub fn log_excerpt(value: &str, max_chars: usize) -> String {
    let excerpt = truncate_chars(value, max_chars);
    if excerpt.len() < value.len() {
        format!("{}…", excerpt)
    } else {
        excerpt.to_string()
    }
}

/// A short, stable fingerprint of the full value.
pub fn value_fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_HEX_LEN);
    digest
}

pub fn log_url_rejection(url: &str, reason: &UrlRejection, excerpt_chars: usize) {
    warn!(
        "Rejected URL in client attributes ({}): '{}' [len={}, sha256={}]",
        reason,
        log_excerpt(url, excerpt_chars),
        char_len(url),
        value_fingerprint(url)
    );
}

pub fn log_truncation(original_length: usize, max_length: usize) {
    warn!(
        "Truncated oversized template value (original length: {}, limit: {})",
        original_length, max_length
    );
}
