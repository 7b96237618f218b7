// File: mailctx-core/src/factory.rs
//! Provider factory: wires the enriching decorator around the host's default provider.
//!
//! The host calls `init` once with its configuration, `post_init` after every factory is
//! initialized, `create` per session, and `close` at shutdown. Creation fails only when
//! the default provider cannot be obtained, since nothing could be sent without it.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, error, info, trace};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::SanitizerConfig;
use crate::engine::TemplateSanitizer;
use crate::engines::regex_engine::RegexSanitizer;
use crate::errors::MailCtxError;
use crate::oneshot::shared_default_sanitizer;
use crate::provider::{EmailTemplateProvider, EnrichingEmailTemplateProvider};

/// Identifier under which this provider is registered with the host.
pub const PROVIDER_ID: &str = "custom-email-template";

/// Identifier of the host's built-in provider that gets wrapped.
pub const DEFAULT_PROVIDER_ID: &str = "default";

/// Gives the factory access to other providers registered in the host session.
pub trait ProviderSession {
    /// Returns a fresh instance of the email template provider registered as `provider_id`.
    fn email_template_provider(&self, provider_id: &str) -> Option<Box<dyn EmailTemplateProvider>>;
}

/// Host-supplied factory settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FactoryConfig {
    /// Optional YAML file overriding the built-in sanitizer settings.
    pub sanitizer_config: Option<PathBuf>,
    /// Provider id of the delegate to wrap; defaults to `default`.
    pub delegate_provider: Option<String>,
}

#[derive(Default)]
pub struct EnrichingProviderFactory {
    sanitizer: Option<Arc<dyn TemplateSanitizer>>,
    delegate_provider: Option<String>,
}

impl EnrichingProviderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    /// Takes precedence over the host's built-in provider, which orders at 0.
    pub fn order(&self) -> i32 {
        100
    }

    /// Loads the sanitizer configuration. Without a config file the shared default
    /// sanitizer is used.
    pub fn init(&mut self, config: &FactoryConfig) -> Result<()> {
        debug!("Initializing {}", PROVIDER_ID);

        self.delegate_provider = config.delegate_provider.clone();
        if let Some(path) = &config.sanitizer_config {
            let sanitizer_config = SanitizerConfig::load_from_file(path)?;
            let sanitizer = RegexSanitizer::new(sanitizer_config)
                .with_context(|| format!("Failed to build sanitizer from {}", path.display()))?;
            self.sanitizer = Some(Arc::new(sanitizer));
            info!("{} using sanitizer configuration from {}", PROVIDER_ID, path.display());
        }
        Ok(())
    }

    pub fn post_init(&mut self) {
        debug!("Post-initializing {}", PROVIDER_ID);
    }

    /// Wraps the session's default provider.
    pub fn create(&self, session: &dyn ProviderSession) -> Result<EnrichingEmailTemplateProvider, MailCtxError> {
        let delegate_id = self.delegate_provider.as_deref().unwrap_or(DEFAULT_PROVIDER_ID);

        let Some(delegate) = session.email_template_provider(delegate_id) else {
            error!("Default EmailTemplateProvider '{}' not found. Cannot create {}", delegate_id, PROVIDER_ID);
            return Err(MailCtxError::DelegateUnavailable(delegate_id.to_string()));
        };

        trace!("Creating enriching provider wrapping '{}'", delegate_id);
        let sanitizer = self
            .sanitizer
            .clone()
            .unwrap_or_else(shared_default_sanitizer);
        Ok(EnrichingEmailTemplateProvider::with_sanitizer(delegate, sanitizer))
    }

    pub fn close(&mut self) {
        debug!("Closing {} factory", PROVIDER_ID);
        self.sanitizer = None;
    }
}
