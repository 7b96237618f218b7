// File: mailctx-core/src/registry.rs
//! Client registry boundary.
//!
//! The identity provider owns client registration; this crate only reads from it through
//! [`RealmModel`]. Lookups may miss or fail, and both outcomes mean "send without client
//! branding" to the caller.
//!
//! [`InMemoryRealm`] backs the preview CLI and tests with clients loaded from YAML.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Read-only view of a registered OAuth/OIDC client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientRecord {
    pub client_id: String,
    pub name: Option<String>,
    /// Arbitrary attributes; most are never exposed to templates.
    pub attributes: HashMap<String, String>,
}

/// A tenant-scoped client directory.
pub trait RealmModel: Send + Sync {
    /// The realm's name, for logging.
    fn name(&self) -> &str;

    /// Looks a client up by its client id. `Ok(None)` is a miss, not an error.
    fn client_by_client_id(&self, client_id: &str) -> Result<Option<ClientRecord>>;
}

/// Clients held in memory, keyed by client id.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct InMemoryRealm {
    pub realm: String,
    pub clients: Vec<ClientRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl InMemoryRealm {
    pub fn new(realm: impl Into<String>, clients: Vec<ClientRecord>) -> Self {
        let mut out = Self {
            realm: realm.into(),
            clients,
            index: HashMap::new(),
        };
        out.reindex();
        out
    }

    /// Loads a realm from a YAML file of the form `{ realm: .., clients: [..] }`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read realm file {}", path.display()))?;
        let mut realm: InMemoryRealm = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse realm file {}", path.display()))?;
        realm.reindex();
        info!(
            "Loaded realm '{}' with {} clients from {}.",
            realm.realm,
            realm.clients.len(),
            path.display()
        );
        Ok(realm)
    }

    // Later entries win on duplicate client ids.
    fn reindex(&mut self) {
        self.index = self
            .clients
            .iter()
            .enumerate()
            .map(|(i, c)| (c.client_id.clone(), i))
            .collect();
    }
}

impl RealmModel for InMemoryRealm {
    fn name(&self) -> &str {
        &self.realm
    }

    fn client_by_client_id(&self, client_id: &str) -> Result<Option<ClientRecord>> {
        let found = self.index.get(client_id).map(|&i| self.clients[i].clone());
        debug!(
            "Realm '{}' lookup for '{}': {}",
            self.realm,
            client_id,
            if found.is_some() { "hit" } else { "miss" }
        );
        Ok(found)
    }
}
