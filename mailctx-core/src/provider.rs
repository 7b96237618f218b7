// File: mailctx-core/src/provider.rs
//! The email template provider interface and the enriching decorator.
//!
//! [`EnrichingEmailTemplateProvider`] owns the downstream provider and implements the
//! same trait. The two generic `send` variants are routed through the
//! [`ContextBuilder`]; every other operation is forwarded unchanged.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::builder::ContextBuilder;
use crate::context::TemplateContext;
use crate::engine::TemplateSanitizer;
use crate::errors::MailCtxError;
use crate::model::{AuthenticationSession, Event, User};
use crate::registry::RealmModel;

/// Result of a send operation; errors come from the provider doing the delivery.
pub type SendResult = Result<(), MailCtxError>;

/// Renders and delivers identity-provider emails.
///
/// Setters configure per-session state; `send*` methods render and deliver. Expiration
/// values are in minutes.
pub trait EmailTemplateProvider: Send {
    fn set_realm(&mut self, realm: Arc<dyn RealmModel>);

    fn set_user(&mut self, user: User);

    fn set_attribute(&mut self, name: &str, value: Value);

    fn set_authentication_session(&mut self, session: AuthenticationSession);

    fn send(&self, template_id: &str, subject: &str, template_data: Option<&TemplateContext>) -> SendResult;

    fn send_to(
        &self,
        template_id: &str,
        recipients: &[String],
        subject: &str,
        template_data: Option<&TemplateContext>,
    ) -> SendResult;

    fn send_verify_email(&self, link: &str, expiration_minutes: i64) -> SendResult;

    fn send_password_reset(&self, link: &str, expiration_minutes: i64) -> SendResult;

    fn send_email_update_confirmation(
        &self,
        link: &str,
        expiration_minutes: i64,
        expired_message: &str,
    ) -> SendResult;

    fn send_execute_actions(&self, link: &str, expiration_minutes: i64) -> SendResult;

    fn send_confirm_identity_broker_link(&self, link: &str, expiration_minutes: i64) -> SendResult;

    fn send_event(&self, event: &Event) -> SendResult;

    fn send_smtp_test_email(&self, config: &HashMap<String, String>, user: &User) -> SendResult;

    /// Releases resources held by the provider.
    fn close(&mut self);
}

/// Decorates a downstream provider with sanitized client-branding enrichment.
pub struct EnrichingEmailTemplateProvider {
    delegate: Box<dyn EmailTemplateProvider>,
    builder: ContextBuilder,
}

impl EnrichingEmailTemplateProvider {
    /// Wraps `delegate`, sanitizing with the default FreeMarker sanitizer.
    pub fn new(delegate: Box<dyn EmailTemplateProvider>) -> Self {
        Self {
            delegate,
            builder: ContextBuilder::default(),
        }
    }

    pub fn with_sanitizer(delegate: Box<dyn EmailTemplateProvider>, sanitizer: Arc<dyn TemplateSanitizer>) -> Self {
        Self {
            delegate,
            builder: ContextBuilder::new(sanitizer),
        }
    }

    /// The enrichment step on its own, as used by `send` and `send_to`.
    pub fn build_context(
        &self,
        template_id: &str,
        subject: &str,
        template_data: Option<&TemplateContext>,
    ) -> TemplateContext {
        self.builder.build_context(template_id, subject, template_data)
    }

    pub fn context_builder(&self) -> &ContextBuilder {
        &self.builder
    }
}

impl EmailTemplateProvider for EnrichingEmailTemplateProvider {
    fn set_realm(&mut self, realm: Arc<dyn RealmModel>) {
        self.builder.set_realm(Arc::clone(&realm));
        self.delegate.set_realm(realm);
    }

    fn set_user(&mut self, user: User) {
        self.delegate.set_user(user);
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.delegate.set_attribute(name, value);
    }

    fn set_authentication_session(&mut self, session: AuthenticationSession) {
        self.delegate.set_authentication_session(session);
    }

    fn send(&self, template_id: &str, subject: &str, template_data: Option<&TemplateContext>) -> SendResult {
        let enriched = self.build_context(template_id, subject, template_data);
        self.delegate.send(template_id, subject, Some(&enriched))
    }

    fn send_to(
        &self,
        template_id: &str,
        recipients: &[String],
        subject: &str,
        template_data: Option<&TemplateContext>,
    ) -> SendResult {
        let enriched = self.build_context(template_id, subject, template_data);
        self.delegate.send_to(template_id, recipients, subject, Some(&enriched))
    }

    fn send_verify_email(&self, link: &str, expiration_minutes: i64) -> SendResult {
        self.delegate.send_verify_email(link, expiration_minutes)
    }

    fn send_password_reset(&self, link: &str, expiration_minutes: i64) -> SendResult {
        self.delegate.send_password_reset(link, expiration_minutes)
    }

    fn send_email_update_confirmation(
        &self,
        link: &str,
        expiration_minutes: i64,
        expired_message: &str,
    ) -> SendResult {
        self.delegate
            .send_email_update_confirmation(link, expiration_minutes, expired_message)
    }

    fn send_execute_actions(&self, link: &str, expiration_minutes: i64) -> SendResult {
        self.delegate.send_execute_actions(link, expiration_minutes)
    }

    fn send_confirm_identity_broker_link(&self, link: &str, expiration_minutes: i64) -> SendResult {
        self.delegate.send_confirm_identity_broker_link(link, expiration_minutes)
    }

    fn send_event(&self, event: &Event) -> SendResult {
        self.delegate.send_event(event)
    }

    fn send_smtp_test_email(&self, config: &HashMap<String, String>, user: &User) -> SendResult {
        self.delegate.send_smtp_test_email(config, user)
    }

    fn close(&mut self) {
        debug!("Closing enriching email template provider.");
        self.delegate.close();
    }
}
