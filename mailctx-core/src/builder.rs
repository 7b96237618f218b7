// File: mailctx-core/src/builder.rs
//! The context builder: copies template data, scrubs it, and injects sanitized client
//! branding.
//!
//! Enrichment is best-effort. Registry failures and lookup misses are logged and the
//! email goes out without a `client` entry; `build_context` itself cannot fail.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::context::{ClientContext, TemplateContext, CLIENT_ID_KEY, CLIENT_KEY};
use crate::engine::TemplateSanitizer;
use crate::oneshot::shared_default_sanitizer;
use crate::registry::{ClientRecord, RealmModel};

pub struct ContextBuilder {
    sanitizer: Arc<dyn TemplateSanitizer>,
    realm: Option<Arc<dyn RealmModel>>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(shared_default_sanitizer())
    }
}

impl ContextBuilder {
    pub fn new(sanitizer: Arc<dyn TemplateSanitizer>) -> Self {
        Self { sanitizer, realm: None }
    }

    /// Sets the realm used for client lookups. Without one, contexts are never enriched.
    pub fn set_realm(&mut self, realm: Arc<dyn RealmModel>) {
        debug!("Context builder bound to realm '{}'.", realm.name());
        self.realm = Some(realm);
    }

    pub fn sanitizer(&self) -> &dyn TemplateSanitizer {
        self.sanitizer.as_ref()
    }

    /// Builds the context handed to the renderer.
    ///
    /// `template_data` is copied, never mutated; `None` is treated as empty.
    pub fn build_context(
        &self,
        template_id: &str,
        subject: &str,
        template_data: Option<&TemplateContext>,
    ) -> TemplateContext {
        let mut context = template_data.cloned().unwrap_or_default();
        debug!(
            "Building context for template '{}' ({} entries, subject length {}).",
            template_id,
            context.len(),
            subject.chars().count()
        );

        self.sanitize_template_data(&mut context);

        if let Err(e) = self.enrich_with_client(&mut context, template_id) {
            warn!(
                "Error enhancing email template context with client information for template: {}: {:#}",
                template_id, e
            );
        }

        context
    }

    /// Projects a client record into its sanitized template form.
    pub fn build_client_context(&self, client: &ClientRecord) -> ClientContext {
        ClientContext::from_record(client, self.sanitizer.as_ref())
    }

    /// Drops engine-internal keys and cleans any string that carries directive markers,
    /// at any depth.
    fn sanitize_template_data(&self, context: &mut TemplateContext) {
        for key in self.sanitizer.reserved_keys() {
            if context.remove(key).is_some() {
                warn!("Removed reserved template key '{}' from template data.", key);
            }
        }
        for (key, value) in context.iter_mut() {
            self.sanitize_value(key, value);
        }
    }

    fn sanitize_value(&self, key: &str, value: &mut Value) {
        match value {
            Value::String(s) if self.sanitizer.looks_suspicious(s.as_str()) => {
                debug!("Sanitizing suspicious template value under '{}'.", key);
                *s = self
                    .sanitizer
                    .sanitize_for_template(Some(s.as_str()))
                    .unwrap_or_default();
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.sanitize_value(key, item)),
            Value::Object(map) => map
                .iter_mut()
                .for_each(|(child, item)| self.sanitize_value(child, item)),
            _ => {}
        }
    }

    fn enrich_with_client(&self, context: &mut TemplateContext, template_id: &str) -> Result<()> {
        let Some(client_id) = context.get(CLIENT_ID_KEY).and_then(Value::as_str) else {
            return Ok(());
        };
        if client_id.trim().is_empty() {
            return Ok(());
        }
        let client_id = client_id.to_string();

        let Some(realm) = self.realm.as_ref() else {
            debug!("No realm configured; skipping client enrichment for template: {}", template_id);
            return Ok(());
        };

        let client = realm
            .client_by_client_id(&client_id)
            .with_context(|| format!("Client lookup failed for clientId '{}' in realm '{}'", client_id, realm.name()))?;

        let Some(client) = client else {
            debug!("Client not found for clientId: {} in template: {}", client_id, template_id);
            return Ok(());
        };

        let client_context = self.build_client_context(&client);
        context.insert(CLIENT_KEY.to_string(), client_context.to_value());

        debug!("Injected client context for client: {} in template: {}", client_id, template_id);
        Ok(())
    }
}
