// File: mailctx-core/src/validators.rs
//! Programmatic validation functions for values headed into email templates.
//!
//! The sanitizer strips directive syntax; these checks decide whether what remains of a
//! URL is acceptable at all. Length is always measured in characters so that multi-byte
//! input cannot slip past a ceiling or be cut inside a code point.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// Line terminators are excluded so a URL cannot smuggle a second line past the scheme check.
static ALLOWED_URL_SCHEME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://|data:image/)[^\r\n\x{85}\x{2028}\x{2029}]*\z")
        .expect("allowed URL scheme pattern is valid")
});

/// Substrings that disqualify a URL even after its scheme was accepted.
const DANGEROUS_URL_MARKERS: &[&str] = &["javascript:", "data:text/html"];

/// Why a URL was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlRejection {
    #[error("scheme is not http(s) or data:image")]
    DisallowedScheme,
    #[error("contains a script or HTML payload")]
    DangerousPayload,
    #[error("length {length} exceeds maximum {max}")]
    TooLong { length: usize, max: usize },
}

/// `true` if the URL starts with `http://`, `https://` or `data:image/` and is a single line.
pub fn has_allowed_scheme(url: &str) -> bool {
    ALLOWED_URL_SCHEME.is_match(url)
}

/// `true` if the lowercased URL still carries a `javascript:` or `data:text/html` payload.
pub fn contains_dangerous_payload(url: &str) -> bool {
    let lowered = url.to_lowercase();
    DANGEROUS_URL_MARKERS.iter().any(|marker| lowered.contains(marker))
}

/// Runs the post-stripping URL checks in order: scheme, payload, length.
pub fn validate_url(url: &str, max_length: usize) -> Result<(), UrlRejection> {
    if !has_allowed_scheme(url) {
        return Err(UrlRejection::DisallowedScheme);
    }
    if contains_dangerous_payload(url) {
        return Err(UrlRejection::DangerousPayload);
    }
    let length = char_len(url);
    if length > max_length {
        return Err(UrlRejection::TooLong { length, max: max_length });
    }
    Ok(())
}

/// Number of characters (not bytes) in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Returns the prefix of `s` holding at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_schemes() {
        assert!(has_allowed_scheme("https://cdn.example.com/logo.png"));
        assert!(has_allowed_scheme("http://example.com"));
        assert!(has_allowed_scheme("data:image/png;base64,iVBORw0KGgo="));
    }

    #[test]
    fn test_disallowed_schemes() {
        for url in ["javascript:alert(1)", "ftp://x", "/relative/path", "file:///etc/passwd", "HTTPS://upper.example.com", ""] {
            assert!(!has_allowed_scheme(url), "expected '{}' to be rejected", url);
        }
    }

    #[test]
    fn test_multiline_url_rejected() {
        assert!(!has_allowed_scheme("https://example.com/\njavascript:alert(1)"));
        assert!(!has_allowed_scheme("https://example.com/\r\nX-Injected: 1"));
    }

    #[test]
    fn test_dangerous_payload_is_case_insensitive() {
        assert!(contains_dangerous_payload("https://x.example/?r=JaVaScRiPt:alert(1)"));
        assert!(contains_dangerous_payload("data:image/svg+xml,data:TEXT/HTML,<b>"));
        assert!(!contains_dangerous_payload("https://example.com/javascript-guide"));
    }

    #[test]
    fn test_validate_url_order() {
        assert_eq!(validate_url("ftp://x", 10), Err(UrlRejection::DisallowedScheme));
        assert_eq!(
            validate_url("https://a.example/javascript:x", 2048),
            Err(UrlRejection::DangerousPayload)
        );
        assert_eq!(
            validate_url("https://a.example/", 10),
            Err(UrlRejection::TooLong { length: 18, max: 10 })
        );
        assert_eq!(validate_url("https://a.example/", 18), Ok(()));
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("日本語", 1), "日");
        assert_eq!(char_len("日本語"), 3);
    }
}
