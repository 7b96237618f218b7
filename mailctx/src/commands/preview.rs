// mailctx/src/commands/preview.rs
//! `mailctx preview`: runs template data through the enriching provider and prints the
//! context the template would have been rendered with.
//!
//! The downstream provider here is [`PreviewProvider`], which captures what it is asked
//! to send instead of rendering and delivering it. Everything upstream of it (factory,
//! decorator, context builder, sanitizer) is the production pipeline.

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use mailctx_core::{
    AuthenticationSession, EmailTemplateProvider, EnrichingProviderFactory, Event, FactoryConfig, InMemoryRealm,
    MailCtxError, ProviderSession, RealmModel, SendResult, TemplateContext, TemplateSanitizer, User,
    DEFAULT_PROVIDER_ID,
};

use crate::cli::PreviewCommand;
use crate::commands::read_stdin;

/// One email captured by the preview provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedEmail {
    pub template_id: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
    pub context: TemplateContext,
}

type Outbox = Arc<Mutex<Vec<RenderedEmail>>>;

/// A terminal provider that captures generic sends into a shared outbox.
#[derive(Clone, Default)]
pub struct PreviewProvider {
    outbox: Outbox,
}

impl PreviewProvider {
    pub fn new(outbox: Outbox) -> Self {
        Self { outbox }
    }

    fn capture(&self, email: RenderedEmail) -> SendResult {
        debug!("Captured '{}' with {} context entries.", email.template_id, email.context.len());
        self.outbox
            .lock()
            .map_err(|_| MailCtxError::Delivery("preview outbox lock poisoned".to_string()))?
            .push(email);
        Ok(())
    }

    fn skip(&self, operation: &str) -> SendResult {
        info!("Preview does not render '{}'; nothing captured.", operation);
        Ok(())
    }
}

impl EmailTemplateProvider for PreviewProvider {
    fn set_realm(&mut self, realm: Arc<dyn RealmModel>) {
        debug!("Preview provider bound to realm '{}'.", realm.name());
    }

    fn set_user(&mut self, _user: User) {}

    fn set_attribute(&mut self, _name: &str, _value: Value) {}

    fn set_authentication_session(&mut self, _session: AuthenticationSession) {}

    fn send(&self, template_id: &str, subject: &str, template_data: Option<&TemplateContext>) -> SendResult {
        self.capture(RenderedEmail {
            template_id: template_id.to_string(),
            subject: subject.to_string(),
            recipients: Vec::new(),
            context: template_data.cloned().unwrap_or_default(),
        })
    }

    fn send_to(
        &self,
        template_id: &str,
        recipients: &[String],
        subject: &str,
        template_data: Option<&TemplateContext>,
    ) -> SendResult {
        self.capture(RenderedEmail {
            template_id: template_id.to_string(),
            subject: subject.to_string(),
            recipients: recipients.to_vec(),
            context: template_data.cloned().unwrap_or_default(),
        })
    }

    fn send_verify_email(&self, _link: &str, _expiration_minutes: i64) -> SendResult {
        self.skip("send_verify_email")
    }

    fn send_password_reset(&self, _link: &str, _expiration_minutes: i64) -> SendResult {
        self.skip("send_password_reset")
    }

    fn send_email_update_confirmation(&self, _link: &str, _expiration_minutes: i64, _expired_message: &str) -> SendResult {
        self.skip("send_email_update_confirmation")
    }

    fn send_execute_actions(&self, _link: &str, _expiration_minutes: i64) -> SendResult {
        self.skip("send_execute_actions")
    }

    fn send_confirm_identity_broker_link(&self, _link: &str, _expiration_minutes: i64) -> SendResult {
        self.skip("send_confirm_identity_broker_link")
    }

    fn send_event(&self, _event: &Event) -> SendResult {
        self.skip("send_event")
    }

    fn send_smtp_test_email(&self, _config: &HashMap<String, String>, _user: &User) -> SendResult {
        self.skip("send_smtp_test_email")
    }

    fn close(&mut self) {}
}

/// Hands out preview providers under the default provider id.
pub struct PreviewSession {
    outbox: Outbox,
}

impl ProviderSession for PreviewSession {
    fn email_template_provider(&self, provider_id: &str) -> Option<Box<dyn EmailTemplateProvider>> {
        (provider_id == DEFAULT_PROVIDER_ID)
            .then(|| Box::new(PreviewProvider::new(Arc::clone(&self.outbox))) as Box<dyn EmailTemplateProvider>)
    }
}

/// Inputs of one preview run.
pub struct PreviewOptions {
    pub template_id: String,
    pub subject: String,
    pub recipients: Vec<String>,
    pub data: TemplateContext,
    pub realm: Option<InMemoryRealm>,
    pub sanitizer_config: Option<PathBuf>,
}

/// Sends `opts.data` through a freshly created enriching provider and returns what the
/// preview provider captured.
pub fn run_preview(opts: PreviewOptions) -> Result<RenderedEmail> {
    let mut factory = EnrichingProviderFactory::new();
    factory.init(&FactoryConfig {
        sanitizer_config: opts.sanitizer_config,
        delegate_provider: None,
    })?;
    factory.post_init();

    let outbox: Outbox = Arc::default();
    let session = PreviewSession { outbox: Arc::clone(&outbox) };
    let mut provider = factory
        .create(&session)
        .context("Failed to create the enriching email provider")?;

    let settings = provider.context_builder().sanitizer().config();
    debug!(
        "Previewing with {:?} directive syntax (string limit {}, URL limit {}).",
        settings.syntax, settings.max_string_length, settings.max_url_length
    );

    if let Some(realm) = opts.realm {
        provider.set_realm(Arc::new(realm));
    }

    let sent = if opts.recipients.is_empty() {
        provider.send(&opts.template_id, &opts.subject, Some(&opts.data))
    } else {
        provider.send_to(&opts.template_id, &opts.recipients, &opts.subject, Some(&opts.data))
    };
    sent.context("Preview send failed")?;

    provider.close();
    factory.close();

    let captured = outbox
        .lock()
        .map_err(|_| anyhow!("preview outbox lock poisoned"))?
        .pop();
    captured.context("The enriching provider did not forward the email")
}

/// Parses template data, which must be a JSON object.
pub fn parse_template_data(text: &str) -> Result<TemplateContext> {
    let value: Value = serde_json::from_str(text).context("Template data is not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("Template data must be a JSON object, got {}", json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn read_template_data(path: Option<&Path>) -> Result<TemplateContext> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read template data from {}", path.display()))?,
        None => read_stdin("template data")?,
    };
    parse_template_data(&text)
}

/// Entry point for `mailctx preview`.
pub fn handle_preview(cmd: &PreviewCommand) -> Result<()> {
    let data = read_template_data(cmd.data.as_deref())?;
    let realm = cmd
        .realm
        .as_deref()
        .map(InMemoryRealm::load_from_file)
        .transpose()?;

    let email = run_preview(PreviewOptions {
        template_id: cmd.template.clone(),
        subject: cmd.subject.clone(),
        recipients: cmd.to.clone(),
        data,
        realm,
        sanitizer_config: cmd.config.clone(),
    })?;

    let rendered = serde_json::to_string_pretty(&email).context("Failed to serialize preview")?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", rendered).context("Failed to write preview to stdout")?;
    Ok(())
}
