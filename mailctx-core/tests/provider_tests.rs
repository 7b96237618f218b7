// mailctx-core/tests/provider_tests.rs
//! The enriching decorator and its factory, driven through a recording downstream provider.

mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use common::{client, data, Call, RecordingProvider, TestRealm};
use mailctx_core::{
    AuthenticationSession, EmailTemplateProvider, EnrichingEmailTemplateProvider, EnrichingProviderFactory, Event,
    FactoryConfig, MailCtxError, ProviderSession, User, DEFAULT_PROVIDER_ID, PROVIDER_ID,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

fn realm() -> Arc<TestRealm> {
    Arc::new(TestRealm::new(vec![client(
        "app1",
        Some("My App"),
        &[("logoUri", "https://cdn.example.com/logo.png"), ("secret", "s3cr3t")],
    )]))
}

fn user() -> User {
    User {
        id: "u-1".to_string(),
        username: "ada".to_string(),
        email: Some("ada@example.com".to_string()),
        ..Default::default()
    }
}

fn taken(calls: &Arc<Mutex<Vec<Call>>>) -> Vec<Call> {
    std::mem::take(&mut *calls.lock().unwrap())
}

#[test_log::test]
fn test_send_enriches_before_delegating() -> Result<()> {
    let (delegate, calls) = RecordingProvider::new();
    let mut provider = EnrichingEmailTemplateProvider::new(Box::new(delegate));
    provider.set_realm(realm());

    let input = data(json!({ "clientId": "app1", "link": "https://idp.example/verify" }));
    provider.send("email-verification.ftl", "Verify", Some(&input))?;

    let calls = taken(&calls);
    assert_eq!(calls[0], Call::SetRealm("test-realm".to_string()));
    let Call::Send { template_id, subject, data: Some(sent) } = &calls[1] else {
        panic!("expected an enriched send, got {:?}", calls[1]);
    };
    assert_eq!(template_id, "email-verification.ftl");
    assert_eq!(subject, "Verify");
    assert_eq!(sent["link"], "https://idp.example/verify");
    assert_eq!(sent["client"]["logoUri"], "https://cdn.example.com/logo.png");
    assert!(sent["client"]["attributes"].get("secret").is_none());

    // Caller's map is untouched.
    assert!(!input.contains_key("client"));
    Ok(())
}

#[test_log::test]
fn test_send_to_enriches_and_keeps_recipients() -> Result<()> {
    let (delegate, calls) = RecordingProvider::new();
    let mut provider = EnrichingEmailTemplateProvider::new(Box::new(delegate));
    provider.set_realm(realm());

    let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];
    provider.send_to("org-invite.ftl", &recipients, "Invite", Some(&data(json!({ "clientId": "app1" }))))?;

    match &taken(&calls)[1] {
        Call::SendTo { recipients: sent_to, data: Some(sent), .. } => {
            assert_eq!(sent_to, &recipients);
            assert_eq!(sent["client"]["name"], "My App");
        }
        other => panic!("expected send_to, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_send_without_data_delegates_empty_map() -> Result<()> {
    let (delegate, calls) = RecordingProvider::new();
    let provider = EnrichingEmailTemplateProvider::new(Box::new(delegate));

    provider.send("t", "s", None)?;
    assert_eq!(
        taken(&calls),
        vec![Call::Send {
            template_id: "t".to_string(),
            subject: "s".to_string(),
            data: Some(Default::default()),
        }]
    );
    Ok(())
}

#[test]
fn test_send_without_realm_is_not_enriched() -> Result<()> {
    let (delegate, calls) = RecordingProvider::new();
    let provider = EnrichingEmailTemplateProvider::new(Box::new(delegate));

    let input = data(json!({ "clientId": "app1" }));
    provider.send("t", "s", Some(&input))?;
    assert_eq!(
        taken(&calls),
        vec![Call::Send { template_id: "t".to_string(), subject: "s".to_string(), data: Some(input) }]
    );
    Ok(())
}

#[test]
fn test_registry_failure_still_delivers() -> Result<()> {
    let (delegate, calls) = RecordingProvider::new();
    let mut provider = EnrichingEmailTemplateProvider::new(Box::new(delegate));
    provider.set_realm(realm());

    let input = data(json!({ "clientId": "broken" }));
    provider.send("t", "s", Some(&input))?;

    let calls = taken(&calls);
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1],
        Call::Send { template_id: "t".to_string(), subject: "s".to_string(), data: Some(input) }
    );
    Ok(())
}

#[test]
fn test_pass_through_operations_are_forwarded_unchanged() -> Result<()> {
    let (delegate, calls) = RecordingProvider::new();
    let mut provider = EnrichingEmailTemplateProvider::new(Box::new(delegate));

    let event = Event {
        event_type: "LOGIN_ERROR".to_string(),
        realm_id: "demo".to_string(),
        client_id: Some("app1".to_string()),
        user_id: Some("u-1".to_string()),
        ip_address: Some("203.0.113.7".to_string()),
        time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        details: HashMap::new(),
    };
    let smtp: HashMap<String, String> = [("host".to_string(), "smtp.example.com".to_string())].into();
    let session = AuthenticationSession { tab_id: "tab-9".to_string(), ..Default::default() };

    provider.set_user(user());
    provider.set_attribute("locale", json!("en"));
    provider.set_authentication_session(session);
    provider.send_verify_email("https://idp/v?${x}", 5)?;
    provider.send_password_reset("https://idp/r", 10)?;
    provider.send_email_update_confirmation("https://idp/u", 15, "ada@new.example")?;
    provider.send_execute_actions("https://idp/a", 20)?;
    provider.send_confirm_identity_broker_link("https://idp/b", 25)?;
    provider.send_event(&event)?;
    provider.send_smtp_test_email(&smtp, &user())?;
    provider.close();

    assert_eq!(
        taken(&calls),
        vec![
            Call::SetUser("ada".to_string()),
            Call::SetAttribute("locale".to_string(), Value::String("en".to_string())),
            Call::SetAuthSession("tab-9".to_string()),
            Call::VerifyEmail("https://idp/v?${x}".to_string(), 5),
            Call::PasswordReset("https://idp/r".to_string(), 10),
            Call::EmailUpdateConfirmation("https://idp/u".to_string(), 15, "ada@new.example".to_string()),
            Call::ExecuteActions("https://idp/a".to_string(), 20),
            Call::IdentityBrokerLink("https://idp/b".to_string(), 25),
            Call::Event("LOGIN_ERROR".to_string()),
            Call::SmtpTest(smtp, "ada".to_string()),
            Call::Close,
        ]
    );
    Ok(())
}

#[test]
fn test_delivery_errors_propagate_unchanged() {
    let (delegate, _calls) = RecordingProvider::failing();
    let mut provider = EnrichingEmailTemplateProvider::new(Box::new(delegate));
    provider.set_realm(realm());

    let err = provider
        .send("t", "s", Some(&data(json!({ "clientId": "app1" }))))
        .unwrap_err();
    assert!(matches!(err, MailCtxError::Delivery(ref m) if m == "SMTP server refused connection"));

    let err = provider.send_password_reset("https://idp/r", 10).unwrap_err();
    assert!(matches!(err, MailCtxError::Delivery(_)));
}

struct Session {
    available: Vec<&'static str>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ProviderSession for Session {
    fn email_template_provider(&self, provider_id: &str) -> Option<Box<dyn EmailTemplateProvider>> {
        if !self.available.contains(&provider_id) {
            return None;
        }
        let delegate = RecordingProvider { calls: Arc::clone(&self.calls), fail_sends: false };
        Some(Box::new(delegate))
    }
}

#[test]
fn test_factory_identity() {
    let factory = EnrichingProviderFactory::new();
    assert_eq!(factory.id(), "custom-email-template");
    assert_eq!(factory.id(), PROVIDER_ID);
    assert_eq!(factory.order(), 100);
}

#[test_log::test]
fn test_factory_create_wraps_default_provider() -> Result<()> {
    let mut factory = EnrichingProviderFactory::new();
    factory.init(&FactoryConfig::default())?;
    factory.post_init();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let session = Session { available: vec![DEFAULT_PROVIDER_ID], calls: Arc::clone(&calls) };
    let mut provider = factory.create(&session)?;
    provider.set_realm(realm());
    provider.send("t", "s", Some(&data(json!({ "clientId": "app1" }))))?;

    let recorded = taken(&calls);
    assert!(matches!(&recorded[1], Call::Send { data: Some(d), .. } if d["client"]["name"] == "My App"));
    factory.close();
    Ok(())
}

#[test_log::test]
fn test_factory_create_fails_without_delegate() {
    let factory = EnrichingProviderFactory::new();
    let session = Session { available: vec![], calls: Arc::default() };

    match factory.create(&session) {
        Err(MailCtxError::DelegateUnavailable(id)) => assert_eq!(id, "default"),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("create must fail when the default provider is missing"),
    }
}

#[test]
fn test_factory_honors_delegate_provider_setting() -> Result<()> {
    let mut factory = EnrichingProviderFactory::new();
    factory.init(&FactoryConfig {
        delegate_provider: Some("smtp-freemarker".to_string()),
        ..Default::default()
    })?;

    let session = Session { available: vec!["smtp-freemarker"], calls: Arc::default() };
    assert!(factory.create(&session).is_ok());

    let session = Session { available: vec![DEFAULT_PROVIDER_ID], calls: Arc::default() };
    assert!(matches!(factory.create(&session), Err(MailCtxError::DelegateUnavailable(_))));
    Ok(())
}

#[test]
fn test_factory_init_loads_sanitizer_config() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "max_string_length: 8")?;
    writeln!(file, "syntax: freemarker")?;

    let mut factory = EnrichingProviderFactory::new();
    factory.init(&FactoryConfig { sanitizer_config: Some(file.path().to_path_buf()), ..Default::default() })?;

    let session = Session { available: vec![DEFAULT_PROVIDER_ID], calls: Arc::default() };
    let provider = factory.create(&session)?;
    assert_eq!(provider.context_builder().sanitizer().config().max_string_length, 8);
    assert_eq!(
        provider.context_builder().sanitizer().sanitize_for_template(Some("Acme Identity Portal")),
        Some("Acme Ide".to_string())
    );
    Ok(())
}

#[test]
fn test_factory_init_rejects_invalid_sanitizer_config() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "syntax: custom")?;
    writeln!(file, "directives: []")?;

    let mut factory = EnrichingProviderFactory::new();
    let result = factory.init(&FactoryConfig { sanitizer_config: Some(file.path().to_path_buf()), ..Default::default() });
    assert!(result.is_err());
    Ok(())
}
