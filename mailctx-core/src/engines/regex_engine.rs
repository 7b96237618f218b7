// mailctx-core/src/engines/regex_engine.rs
//! A `TemplateSanitizer` implementation that strips directive syntax with regular
//! expressions.
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::config::SanitizerConfig;
use crate::engine::TemplateSanitizer;
use crate::errors::MailCtxError;
use crate::rejection::{log_truncation, log_url_rejection};
use crate::sanitizers::compiler::{compile_patterns, CompiledPatterns};
use crate::validators::{self, char_len, truncate_chars, UrlRejection};

lazy_static! {
    /// `<script>` blocks, whatever their attributes or content.
    static ref SCRIPT_BLOCK: Regex = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    /// Inline event handler attributes such as `onclick=` or `onerror =`.
    static ref EVENT_HANDLER: Regex = Regex::new(r"(?i)on\w+\s*=").unwrap();
}

/// Raw input is cut to this multiple of the output ceiling before stripping. Each
/// stripping pass removes at least one character, so this also bounds the pass count.
const RAW_INPUT_FACTOR: usize = 4;

/// Removes every match of `regexes` until nothing matches any more.
///
/// Stripping one match can splice its neighbours into a fresh one
/// (`<<#x#>#y#>` becomes `<#y#>`), so a single pass is not enough.
/// Every pattern matches at least one character, so each pass either shrinks the
/// value or ends the loop.
fn strip_to_fixpoint(value: &str, regexes: &[&Regex]) -> String {
    let mut current = value.to_string();
    loop {
        let mut next = current.clone();
        for regex in regexes {
            if regex.is_match(&next) {
                next = regex.replace_all(&next, "").into_owned();
            }
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

#[derive(Debug)]
pub struct RegexSanitizer {
    patterns: CompiledPatterns,
    config: SanitizerConfig,
    markers: Vec<String>,
    reserved_keys: Vec<String>,
}

impl RegexSanitizer {
    pub fn new(config: SanitizerConfig) -> Result<Self, MailCtxError> {
        config.validate()?;
        let patterns = compile_patterns(config.effective_directives())?;
        debug!(
            "RegexSanitizer ready: {} directive patterns ({} for URLs).",
            patterns.patterns.len(),
            patterns.for_urls().count()
        );
        Ok(Self {
            markers: config.effective_markers(),
            reserved_keys: config.effective_reserved_keys(),
            patterns,
            config,
        })
    }

    fn template_regexes(&self) -> Vec<&Regex> {
        self.patterns
            .for_templates()
            .map(|p| &p.regex)
            .chain([&*SCRIPT_BLOCK, &*EVENT_HANDLER])
            .collect()
    }

    fn url_regexes(&self) -> Vec<&Regex> {
        self.patterns.for_urls().map(|p| &p.regex).collect()
    }

    fn reject_url(&self, url: &str, reason: UrlRejection) -> Option<String> {
        log_url_rejection(url, &reason, self.config.log_excerpt_length);
        None
    }
}

impl TemplateSanitizer for RegexSanitizer {
    fn sanitize_for_template(&self, value: Option<&str>) -> Option<String> {
        let value = value?;
        let max = self.config.max_string_length;

        let raw_limit = max.saturating_mul(RAW_INPUT_FACTOR);
        let raw_length = char_len(value);
        let input = if raw_length > raw_limit {
            log_truncation(raw_length, raw_limit);
            truncate_chars(value, raw_limit)
        } else {
            value
        };

        let stripped = strip_to_fixpoint(input, &self.template_regexes());

        let bounded = if char_len(&stripped) > max {
            log_truncation(raw_length, max);
            truncate_chars(&stripped, max)
        } else {
            stripped.as_str()
        };

        Some(bounded.trim().to_string())
    }

    fn sanitize_url(&self, value: Option<&str>) -> Option<String> {
        let trimmed = value?.trim();

        let max = self.config.max_url_length;
        let length = char_len(trimmed);
        if length > max.saturating_mul(RAW_INPUT_FACTOR) {
            return self.reject_url(trimmed, UrlRejection::TooLong { length, max });
        }

        if !validators::has_allowed_scheme(trimmed) {
            return self.reject_url(trimmed, UrlRejection::DisallowedScheme);
        }

        let stripped = strip_to_fixpoint(trimmed, &self.url_regexes());

        match validators::validate_url(&stripped, max) {
            Ok(()) => Some(stripped),
            Err(reason) => self.reject_url(trimmed, reason),
        }
    }

    fn looks_suspicious(&self, value: &str) -> bool {
        self.markers.iter().any(|marker| value.contains(marker.as_str()))
    }

    fn reserved_keys(&self) -> &[String] {
        &self.reserved_keys
    }

    fn config(&self) -> &SanitizerConfig {
        &self.config
    }
}
