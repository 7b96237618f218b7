// mailctx-core/tests/common/mod.rs
//! Test doubles shared by the integration suites: a recording downstream provider and
//! realm that counts lookups and fails for one client id.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use mailctx_core::{
    AuthenticationSession, ClientRecord, EmailTemplateProvider, Event, MailCtxError, RealmModel,
    SendResult, TemplateContext, User,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One call observed by [`RecordingProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetRealm(String),
    SetUser(String),
    SetAttribute(String, Value),
    SetAuthSession(String),
    Send { template_id: String, subject: String, data: Option<TemplateContext> },
    SendTo { template_id: String, recipients: Vec<String>, subject: String, data: Option<TemplateContext> },
    VerifyEmail(String, i64),
    PasswordReset(String, i64),
    EmailUpdateConfirmation(String, i64, String),
    ExecuteActions(String, i64),
    IdentityBrokerLink(String, i64),
    Event(String),
    SmtpTest(HashMap<String, String>, String),
    Close,
}

/// A downstream provider that records every call into a shared log.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    pub calls: Arc<Mutex<Vec<Call>>>,
    pub fail_sends: bool,
}

impl RecordingProvider {
    pub fn new() -> (Self, Arc<Mutex<Vec<Call>>>) {
        let provider = Self::default();
        let calls = Arc::clone(&provider.calls);
        (provider, calls)
    }

    pub fn failing() -> (Self, Arc<Mutex<Vec<Call>>>) {
        let (mut provider, calls) = Self::new();
        provider.fail_sends = true;
        (provider, calls)
    }

    fn record(&self, call: Call) -> SendResult {
        self.calls.lock().unwrap().push(call);
        if self.fail_sends {
            Err(MailCtxError::Delivery("SMTP server refused connection".to_string()))
        } else {
            Ok(())
        }
    }
}

impl EmailTemplateProvider for RecordingProvider {
    fn set_realm(&mut self, realm: Arc<dyn RealmModel>) {
        self.calls.lock().unwrap().push(Call::SetRealm(realm.name().to_string()));
    }

    fn set_user(&mut self, user: User) {
        self.calls.lock().unwrap().push(Call::SetUser(user.username));
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.calls.lock().unwrap().push(Call::SetAttribute(name.to_string(), value));
    }

    fn set_authentication_session(&mut self, session: AuthenticationSession) {
        self.calls.lock().unwrap().push(Call::SetAuthSession(session.tab_id));
    }

    fn send(&self, template_id: &str, subject: &str, template_data: Option<&TemplateContext>) -> SendResult {
        self.record(Call::Send {
            template_id: template_id.to_string(),
            subject: subject.to_string(),
            data: template_data.cloned(),
        })
    }

    fn send_to(
        &self,
        template_id: &str,
        recipients: &[String],
        subject: &str,
        template_data: Option<&TemplateContext>,
    ) -> SendResult {
        self.record(Call::SendTo {
            template_id: template_id.to_string(),
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            data: template_data.cloned(),
        })
    }

    fn send_verify_email(&self, link: &str, expiration_minutes: i64) -> SendResult {
        self.record(Call::VerifyEmail(link.to_string(), expiration_minutes))
    }

    fn send_password_reset(&self, link: &str, expiration_minutes: i64) -> SendResult {
        self.record(Call::PasswordReset(link.to_string(), expiration_minutes))
    }

    fn send_email_update_confirmation(&self, link: &str, expiration_minutes: i64, expired_message: &str) -> SendResult {
        self.record(Call::EmailUpdateConfirmation(
            link.to_string(),
            expiration_minutes,
            expired_message.to_string(),
        ))
    }

    fn send_execute_actions(&self, link: &str, expiration_minutes: i64) -> SendResult {
        self.record(Call::ExecuteActions(link.to_string(), expiration_minutes))
    }

    fn send_confirm_identity_broker_link(&self, link: &str, expiration_minutes: i64) -> SendResult {
        self.record(Call::IdentityBrokerLink(link.to_string(), expiration_minutes))
    }

    fn send_event(&self, event: &Event) -> SendResult {
        self.record(Call::Event(event.event_type.clone()))
    }

    fn send_smtp_test_email(&self, config: &HashMap<String, String>, user: &User) -> SendResult {
        self.record(Call::SmtpTest(config.clone(), user.username.clone()))
    }

    fn close(&mut self) {
        self.calls.lock().unwrap().push(Call::Close);
    }
}

/// A realm serving fixed records, counting lookups and failing for `broken`.
pub struct TestRealm {
    pub clients: HashMap<String, ClientRecord>,
    pub lookups: AtomicUsize,
}

impl TestRealm {
    pub fn new(clients: Vec<ClientRecord>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.client_id.clone(), c)).collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl RealmModel for TestRealm {
    fn name(&self) -> &str {
        "test-realm"
    }

    fn client_by_client_id(&self, client_id: &str) -> Result<Option<ClientRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if client_id == "broken" {
            return Err(anyhow!("registry connection reset"));
        }
        Ok(self.clients.get(client_id).cloned())
    }
}

pub fn client(client_id: &str, name: Option<&str>, attributes: &[(&str, &str)]) -> ClientRecord {
    ClientRecord {
        client_id: client_id.to_string(),
        name: name.map(str::to_string),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}

pub fn data(value: Value) -> TemplateContext {
    value.as_object().cloned().expect("test data must be a JSON object")
}
