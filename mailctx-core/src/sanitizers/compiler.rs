//! compiler.rs - Compiles directive patterns into ready-to-apply regular expressions.
//!
//! Compilation happens once, when a sanitizer is constructed. The compiled set is
//! immutable afterwards and is shared between threads without locking.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::config::{DirectivePattern, MAX_PATTERN_LENGTH};
use crate::errors::MailCtxError;

/// Represents a single compiled directive pattern.
#[derive(Debug)]
pub struct CompiledPattern {
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    /// The unique name of the directive pattern.
    pub name: String,
    /// Whether the pattern is also stripped from URLs.
    pub strip_in_urls: bool,
}

/// Represents the full, ordered collection of compiled directive patterns.
#[derive(Debug)]
pub struct CompiledPatterns {
    pub patterns: Vec<CompiledPattern>,
}

impl CompiledPatterns {
    /// Patterns applied to generic template strings.
    pub fn for_templates(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter()
    }

    /// Patterns applied to URLs.
    pub fn for_urls(&self) -> impl Iterator<Item = &CompiledPattern> {
        self.patterns.iter().filter(|p| p.strip_in_urls)
    }
}

/// Compiles a list of `DirectivePattern`s. All failures are collected and reported together.
pub fn compile_patterns(patterns: Vec<DirectivePattern>) -> Result<CompiledPatterns, MailCtxError> {
    debug!("Starting compilation of {} directive patterns.", patterns.len());

    let mut compiled = Vec::with_capacity(patterns.len());
    let mut compilation_errors = Vec::new();

    for directive in patterns {
        if directive.pattern.len() > MAX_PATTERN_LENGTH {
            compilation_errors.push(MailCtxError::PatternLengthExceeded(
                directive.name,
                directive.pattern.len(),
                MAX_PATTERN_LENGTH,
            ));
            continue;
        }

        let regex_result = RegexBuilder::new(&directive.pattern)
            .dot_matches_new_line(directive.dot_matches_new_line)
            .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
            .build();

        match regex_result {
            Ok(regex) => {
                log::debug!(
                    target: "mailctx_core::sanitizer",
                    "Directive '{}' compiled successfully.",
                    &directive.name
                );
                compiled.push(CompiledPattern {
                    regex,
                    name: directive.name,
                    strip_in_urls: directive.strip_in_urls,
                });
            }
            Err(e) => compilation_errors.push(MailCtxError::PatternCompilationError(directive.name, e)),
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        return Err(MailCtxError::InvalidConfig(format!(
            "Failed to compile {} directive pattern(s):\n{}",
            compilation_errors.len(),
            error_message
        )));
    }

    debug!("Finished compiling directive patterns. Total compiled: {}.", compiled.len());
    Ok(CompiledPatterns { patterns: compiled })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SanitizerConfig;

    #[test]
    fn test_compile_default_set() {
        let compiled = compile_patterns(SanitizerConfig::default().effective_directives()).unwrap();
        assert_eq!(compiled.patterns.len(), 5);
        assert_eq!(compiled.for_urls().count(), 2);
    }

    #[test]
    fn test_compile_reports_every_failure() {
        let patterns = vec![
            DirectivePattern {
                name: "broken".to_string(),
                pattern: "(unclosed".to_string(),
                strip_in_urls: false,
                dot_matches_new_line: true,
            },
            DirectivePattern {
                name: "huge".to_string(),
                pattern: "a".repeat(MAX_PATTERN_LENGTH + 1),
                strip_in_urls: false,
                dot_matches_new_line: true,
            },
        ];
        let err = compile_patterns(patterns).unwrap_err().to_string();
        assert!(err.contains("Failed to compile 2 directive pattern(s)"));
        assert!(err.contains("'broken'"));
        assert!(err.contains("'huge'"));
    }
}
