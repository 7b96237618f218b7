// mailctx-core/src/lib.rs
//! # mailctx Core Library
//!
//! `mailctx-core` enriches the data map handed to an identity provider's email renderer
//! with sanitized OAuth/OIDC client branding (name, logo, display name), looked up from
//! the `clientId` already present in the map.
//!
//! Templates mix trusted markup with contributed values, so every value that reaches
//! them goes through a sanitizer that strips template directive syntax, refuses unsafe
//! URL schemes and bounds lengths. Only a closed whitelist of client attributes is ever
//! exposed. None of this is allowed to abort mail delivery: enrichment failures are
//! logged and the email goes out without client branding.
//!
//! ## Modules
//!
//! * `config`: `SanitizerConfig` limits and the engine-specific directive syntax.
//! * `sanitizers`: Compiles directive patterns into regular expressions.
//! * `engine`: The `TemplateSanitizer` trait.
//! * `engines`: Concrete sanitizers (`RegexSanitizer`).
//! * `validators`: URL scheme, payload and length checks.
//! * `rejection`: Log-safe excerpts and fingerprints of rejected values.
//! * `context`: `TemplateContext`, the attribute whitelist and `ClientContext`.
//! * `registry`: `ClientRecord`, the `RealmModel` lookup trait and `InMemoryRealm`.
//! * `builder`: `ContextBuilder`, the enrichment pipeline.
//! * `provider`: The `EmailTemplateProvider` trait and the enriching decorator.
//! * `factory`: Creates decorators around the host's default provider.
//! * `oneshot`: Free functions over the default sanitizer.
//!
//! ## Usage Example
//!
//! ```rust
//! use mailctx_core::{ClientRecord, ContextBuilder, InMemoryRealm};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let realm = InMemoryRealm::new("demo", vec![ClientRecord {
//!     client_id: "app1".to_string(),
//!     name: Some("My App".to_string()),
//!     attributes: [("logoUri".to_string(), "https://cdn.example.com/logo.png".to_string())].into(),
//! }]);
//!
//! let mut builder = ContextBuilder::default();
//! builder.set_realm(Arc::new(realm));
//!
//! let data = json!({ "clientId": "app1" }).as_object().cloned().unwrap();
//! let context = builder.build_context("password-reset.ftl", "Reset your password", Some(&data));
//! assert_eq!(context["client"]["logoUri"], "https://cdn.example.com/logo.png");
//! ```
//!
//! ## Error Handling
//!
//! Enrichment never returns an error. `MailCtxError` covers configuration, provider
//! construction and the delegate's own delivery failures; configuration loading uses
//! `anyhow::Error` with context.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod builder;
pub mod config;
pub mod context;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod factory;
pub mod model;
pub mod oneshot;
pub mod provider;
pub mod registry;
pub mod rejection;
pub mod sanitizers;
pub mod validators;

/// Re-exports the sanitizer configuration types.
pub use config::{
    DirectivePattern, DirectiveSyntax, SanitizerConfig, DEFAULT_LOG_EXCERPT_LENGTH,
    DEFAULT_MAX_STRING_LENGTH, DEFAULT_MAX_URL_LENGTH, MAX_PATTERN_LENGTH,
};

/// Re-exports the custom error type for clear error reporting.
pub use errors::MailCtxError;

/// Re-exports the sanitizer trait and its regex implementation.
pub use engine::TemplateSanitizer;
pub use engines::regex_engine::RegexSanitizer;

/// Re-exports the template context types.
pub use context::{ClientAttribute, ClientContext, TemplateContext, CLIENT_ID_KEY, CLIENT_KEY};

/// Re-exports the client registry boundary.
pub use registry::{ClientRecord, InMemoryRealm, RealmModel};

/// Re-exports the enrichment pipeline, provider decorator and factory.
pub use builder::ContextBuilder;
pub use factory::{EnrichingProviderFactory, FactoryConfig, ProviderSession, DEFAULT_PROVIDER_ID, PROVIDER_ID};
pub use model::{AuthenticationSession, Event, User};
pub use provider::{EmailTemplateProvider, EnrichingEmailTemplateProvider, SendResult};

/// Re-exports the one-shot helpers over the default sanitizer.
pub use oneshot::{default_sanitizer, sanitize_for_template, sanitize_url, shared_default_sanitizer};

/// Re-exports URL validation helpers.
pub use validators::UrlRejection;
