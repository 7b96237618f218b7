// File: mailctx-core/src/model.rs
//! Host-side session values forwarded untouched to the downstream email provider.
//!
//! License: MIT OR APACHE 2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The user an email is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// The in-flight authentication session that triggered an email, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthenticationSession {
    pub tab_id: String,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
}

/// An identity-provider event that the admin asked to be notified about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_type: String,
    pub realm_id: String,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub ip_address: Option<String>,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub details: HashMap<String, String>,
}
