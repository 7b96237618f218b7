//! Configuration management for `mailctx-core`.
//!
//! This module defines the sanitizer configuration: length ceilings, log excerpt size and
//! the directive syntax of the downstream template engine. The directive patterns are
//! engine-specific, so the built-in FreeMarker set can be swapped for an explicit custom
//! set. The attribute whitelist is deliberately absent; it is a closed set defined in
//! [`crate::context::ClientAttribute`].
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Maximum allowed length for a directive pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Maximum length of a sanitized template string, in characters.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 500;

/// Maximum length of an accepted URL, in characters.
pub const DEFAULT_MAX_URL_LENGTH: usize = 2048;

/// Number of characters of a rejected value that may appear in a log line.
pub const DEFAULT_LOG_EXCERPT_LENGTH: usize = 50;

/// A single directive pattern to strip from values headed into the template engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct DirectivePattern {
    /// Unique identifier for the pattern (e.g., "freemarker_expression").
    pub name: String,
    /// The regex pattern string. Matching should be non-greedy across delimiters.
    pub pattern: String,
    /// If true, the pattern is also stripped from URL values.
    pub strip_in_urls: bool,
    /// If true, `.` also matches line breaks, so a directive split across lines is still
    /// stripped.
    pub dot_matches_new_line: bool,
}

impl Default for DirectivePattern {
    fn default() -> Self {
        Self {
            name: String::new(),
            pattern: String::new(),
            strip_in_urls: false,
            dot_matches_new_line: true,
        }
    }
}

impl DirectivePattern {
    fn builtin(name: &str, pattern: &str, strip_in_urls: bool) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            strip_in_urls,
            dot_matches_new_line: true,
        }
    }
}

/// The directive syntax family spoken by the downstream template engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveSyntax {
    /// Apache FreeMarker: `<#...>`, `${...}`, `<@...>`, `[#...]`.
    #[default]
    Freemarker,
    /// Patterns, markers and reserved keys are supplied explicitly in the config.
    Custom,
}

/// Sanitizer settings, passed explicitly at construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizerConfig {
    pub max_string_length: usize,
    pub max_url_length: usize,
    pub log_excerpt_length: usize,
    pub syntax: DirectiveSyntax,
    /// Directive patterns, used only with `syntax: custom`.
    pub directives: Vec<DirectivePattern>,
    /// Substrings that make a template data value look suspicious, used only with `syntax: custom`.
    pub suspicious_markers: Vec<String>,
    /// Template data keys naming engine internals, used only with `syntax: custom`.
    pub reserved_keys: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            max_url_length: DEFAULT_MAX_URL_LENGTH,
            log_excerpt_length: DEFAULT_LOG_EXCERPT_LENGTH,
            syntax: DirectiveSyntax::Freemarker,
            directives: Vec::new(),
            suspicious_markers: Vec::new(),
            reserved_keys: Vec::new(),
        }
    }
}

impl SanitizerConfig {
    /// Loads a sanitizer configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading sanitizer configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SanitizerConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        info!(
            "Loaded sanitizer configuration ({:?} syntax, {} directive patterns) from {}.",
            config.syntax,
            config.effective_directives().len(),
            path.display()
        );
        Ok(config)
    }

    /// Loads the built-in configuration from the embedded YAML.
    pub fn load_default() -> Result<Self> {
        debug!("Loading default sanitizer configuration from embedded string...");
        let default_yaml = include_str!("../config/default_sanitizer.yaml");
        let config: SanitizerConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default sanitizer configuration")?;
        Ok(config)
    }

    /// The directive patterns in effect for the configured syntax.
    pub fn effective_directives(&self) -> Vec<DirectivePattern> {
        match self.syntax {
            DirectiveSyntax::Freemarker => freemarker_directives(),
            DirectiveSyntax::Custom => self.directives.clone(),
        }
    }

    /// Markers that flag a template data value for sanitization.
    pub fn effective_markers(&self) -> Vec<String> {
        match self.syntax {
            DirectiveSyntax::Freemarker => vec!["${".to_string(), "<#".to_string()],
            DirectiveSyntax::Custom => self.suspicious_markers.clone(),
        }
    }

    /// Template data keys that must never reach the engine.
    pub fn effective_reserved_keys(&self) -> Vec<String> {
        match self.syntax {
            DirectiveSyntax::Freemarker => vec!["__freemarker".to_string(), ".data_model".to_string()],
            DirectiveSyntax::Custom => self.reserved_keys.clone(),
        }
    }

    /// Validates limits and pattern integrity.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.max_string_length == 0 {
            errors.push("`max_string_length` must be greater than 0.".to_string());
        }
        if self.max_url_length == 0 {
            errors.push("`max_url_length` must be greater than 0.".to_string());
        }
        if self.syntax == DirectiveSyntax::Custom && self.directives.is_empty() {
            errors.push("`syntax: custom` requires at least one entry in `directives`.".to_string());
        }

        let mut names = HashSet::new();
        for directive in self.effective_directives() {
            if directive.name.is_empty() {
                errors.push("A directive has an empty `name` field.".to_string());
            } else if !names.insert(directive.name.clone()) {
                errors.push(format!("Duplicate directive name found: '{}'.", directive.name));
            }

            if directive.pattern.is_empty() {
                errors.push(format!("Directive '{}' has an empty `pattern` field.", directive.name));
                continue;
            }
            if directive.pattern.len() > MAX_PATTERN_LENGTH {
                errors.push(format!(
                    "Directive '{}': pattern length ({}) exceeds maximum allowed ({}).",
                    directive.name,
                    directive.pattern.len(),
                    MAX_PATTERN_LENGTH
                ));
                continue;
            }
            match Regex::new(&directive.pattern) {
                Ok(re) if re.is_match("") => errors.push(format!(
                    "Directive '{}' matches the empty string.",
                    directive.name
                )),
                Ok(_) => {}
                Err(e) => errors.push(format!(
                    "Directive '{}' has an invalid regex pattern: {}",
                    directive.name, e
                )),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow!("Sanitizer configuration validation failed:\n{}", errors.join("\n")))
        }
    }
}

/// The FreeMarker directive family.
///
/// `freemarker_directive` strips `<#...#>` and also a directive opened with `<#` through its
/// closing tag (`<#/if>` or `</#if>`). `freemarker_stray_tag` removes any opener or closer
/// left without a partner.
fn freemarker_directives() -> Vec<DirectivePattern> {
    vec![
        DirectivePattern::builtin("freemarker_directive", r"<#.*?(?:#>|<#/\w*>|</#\w*>)", true),
        DirectivePattern::builtin("freemarker_expression", r"\$\{.*?\}", true),
        DirectivePattern::builtin("freemarker_user_directive", r"<@.*?@>", false),
        DirectivePattern::builtin("freemarker_bracket_directive", r"\[#.*?#\]", false),
        DirectivePattern::builtin("freemarker_stray_tag", r"</?[#@][^>]*>", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_embedded_yaml() {
        let embedded = SanitizerConfig::load_default().unwrap();
        assert_eq!(embedded, SanitizerConfig::default());
    }

    #[test]
    fn test_freemarker_set_is_valid() {
        assert!(SanitizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_url_subset() {
        let url_names: Vec<String> = SanitizerConfig::default()
            .effective_directives()
            .into_iter()
            .filter(|d| d.strip_in_urls)
            .map(|d| d.name)
            .collect();
        assert_eq!(url_names, vec!["freemarker_directive", "freemarker_expression"]);
    }

    #[test]
    fn test_custom_without_directives_rejected() {
        let config = SanitizerConfig {
            syntax: DirectiveSyntax::Custom,
            ..Default::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("requires at least one entry"));
    }

    #[test]
    fn test_empty_matching_pattern_rejected() {
        let config = SanitizerConfig {
            syntax: DirectiveSyntax::Custom,
            directives: vec![DirectivePattern {
                name: "greedy".to_string(),
                pattern: "x*".to_string(),
                strip_in_urls: false,
                dot_matches_new_line: true,
            }],
            ..Default::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("matches the empty string"));
    }
}
