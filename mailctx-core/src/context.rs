// File: mailctx-core/src/context.rs
//! Template context types and the sanitized client projection.
//!
//! A [`TemplateContext`] is the full set of variables visible to the renderer. The
//! [`ClientContext`] is what gets injected under the `client` key: the client id and
//! name, plus only the whitelisted attributes, every value already sanitized.
//!
//! License: MIT OR APACHE 2.0

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::engine::TemplateSanitizer;
use crate::registry::ClientRecord;

/// Variables handed to the template renderer.
pub type TemplateContext = Map<String, Value>;

/// Template data key carrying the client identifier to enrich from.
pub const CLIENT_ID_KEY: &str = "clientId";
/// Template data key under which the client projection is injected.
pub const CLIENT_KEY: &str = "client";

/// The closed set of client attributes that may appear in rendered email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClientAttribute {
    LogoUri,
    LogoUrl,
    DisplayName,
}

impl ClientAttribute {
    pub const ALL: [ClientAttribute; 3] = [
        ClientAttribute::LogoUri,
        ClientAttribute::LogoUrl,
        ClientAttribute::DisplayName,
    ];

    /// The attribute key as stored on the client and exposed to templates.
    pub fn key(self) -> &'static str {
        match self {
            ClientAttribute::LogoUri => "logoUri",
            ClientAttribute::LogoUrl => "logoUrl",
            ClientAttribute::DisplayName => "displayName",
        }
    }

    /// URL attributes go through URL validation instead of plain string sanitization.
    pub fn is_url(self) -> bool {
        matches!(self, ClientAttribute::LogoUri | ClientAttribute::LogoUrl)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.key() == key)
    }
}

impl fmt::Display for ClientAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sanitized client information for email templates.
///
/// Fields are private; once built, the projection can only be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    client_id: String,
    name: Option<String>,
    attributes: BTreeMap<ClientAttribute, String>,
}

impl ClientContext {
    /// Projects a registry record through `sanitizer`.
    ///
    /// Attributes outside the whitelist are skipped without being sanitized or logged. A
    /// whitelisted attribute whose value the sanitizer rejects is left out entirely.
    pub fn from_record(record: &ClientRecord, sanitizer: &dyn TemplateSanitizer) -> Self {
        let attributes = record
            .attributes
            .iter()
            .filter_map(|(key, raw)| ClientAttribute::from_key(key).map(|attr| (attr, raw.as_str())))
            .filter_map(|(attr, raw)| {
                let sanitized = if attr.is_url() {
                    sanitizer.sanitize_url(Some(raw))
                } else {
                    sanitizer.sanitize_for_template(Some(raw))
                };
                sanitized.map(|value| (attr, value))
            })
            .collect();

        Self {
            client_id: sanitizer
                .sanitize_for_template(Some(&record.client_id))
                .unwrap_or_default(),
            name: sanitizer.sanitize_for_template(record.name.as_deref()),
            attributes,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The whitelisted, sanitized attributes.
    pub fn attributes(&self) -> &BTreeMap<ClientAttribute, String> {
        &self.attributes
    }

    pub fn attribute(&self, attr: ClientAttribute) -> Option<&str> {
        self.attributes.get(&attr).map(String::as_str)
    }

    pub fn logo_uri(&self) -> Option<&str> {
        self.attribute(ClientAttribute::LogoUri)
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.attribute(ClientAttribute::LogoUrl)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.attribute(ClientAttribute::DisplayName)
    }

    /// Renders the projection as the template value placed under `client`.
    ///
    /// The convenience keys `logoUri`, `logoUrl` and `displayName` are always present and
    /// `null` when the attribute is missing or was rejected; `attributes` holds only the
    /// accepted ones.
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert(CLIENT_ID_KEY.to_string(), Value::String(self.client_id.clone()));
        out.insert(
            "name".to_string(),
            self.name.clone().map(Value::String).unwrap_or(Value::Null),
        );

        let attributes: Map<String, Value> = self
            .attributes
            .iter()
            .map(|(attr, value)| (attr.key().to_string(), Value::String(value.clone())))
            .collect();
        out.insert("attributes".to_string(), Value::Object(attributes));

        for attr in ClientAttribute::ALL {
            let value = self
                .attribute(attr)
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null);
            out.insert(attr.key().to_string(), value);
        }

        Value::Object(out)
    }
}
