//! Provider registry — named endpoints, credentials and model lists.
//!
//! Each provider is stored as an `Arc<ProviderRecord>`. Updates clone the
//! record, edit the clone and swap the `Arc` in under the write lock, so a
//! concurrent reader sees either the old record or the new one in full.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use agentnx_core::config::ProviderEntry;
use agentnx_core::types::{ModelListResponse, ModelReference};
use agentnx_core::{Error, ModelDescriptor, Result};

use crate::http::{endpoint_url, status_error, transport_error};

// ─────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────

/// Everything the registry knows about one provider.
#[derive(Clone, Default, PartialEq)]
pub struct ProviderRecord {
    pub base_url: String,
    pub credential: String,
    pub models: Vec<ModelDescriptor>,
    pub models_fetched_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for ProviderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRecord")
            .field("base_url", &self.base_url)
            .field("credential_set", &!self.credential.is_empty())
            .field("models", &self.models.len())
            .finish()
    }
}

impl From<&ProviderEntry> for ProviderRecord {
    fn from(entry: &ProviderEntry) -> Self {
        ProviderRecord {
            base_url: entry.url.clone(),
            credential: entry.api_key.clone(),
            models: entry.models.clone(),
            models_fetched_at: entry.models_fetched_at,
        }
    }
}

impl From<&ProviderRecord> for ProviderEntry {
    fn from(record: &ProviderRecord) -> Self {
        ProviderEntry {
            url: record.base_url.clone(),
            api_key: record.credential.clone(),
            models: record.models.clone(),
            models_fetched_at: record.models_fetched_at,
        }
    }
}

/// Base URL + credential needed to call a provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub base_url: String,
    pub credential: String,
}

impl fmt::Debug for ResolvedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedEndpoint")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────
// ProviderRegistry
// ─────────────────────────────────────────────

/// Thread-safe store of provider records plus the HTTP client used to talk
/// to them.
pub struct ProviderRegistry {
    client: reqwest::Client,
    records: RwLock<HashMap<String, Arc<ProviderRecord>>>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_names())
            .finish()
    }
}

impl ProviderRegistry {
    /// Empty registry using `client` for every outbound call.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Registry pre-populated from the settings' `providers` map.
    pub fn from_providers(client: reqwest::Client, providers: &BTreeMap<String, ProviderEntry>) -> Self {
        let registry = Self::new(client);
        registry.replace_all(providers);
        registry
    }

    /// The shared HTTP client.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<ProviderRecord>>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<ProviderRecord>>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Clone-edit-swap one record, creating it when absent.
    fn upsert(&self, provider: &str, edit: impl FnOnce(&mut ProviderRecord)) {
        let mut records = self.write();
        let mut record = records
            .get(provider)
            .map(|r| ProviderRecord::clone(r))
            .unwrap_or_default();
        edit(&mut record);
        records.insert(provider.to_string(), Arc::new(record));
    }

    // ────────────── Settings commands ──────────────

    /// Replace every record with the given settings.
    pub fn replace_all(&self, providers: &BTreeMap<String, ProviderEntry>) {
        let fresh: HashMap<String, Arc<ProviderRecord>> = providers
            .iter()
            .map(|(name, entry)| (name.clone(), Arc::new(ProviderRecord::from(entry))))
            .collect();
        debug!(providers = fresh.len(), "provider registry reloaded");
        *self.write() = fresh;
    }

    /// Register an empty provider. Returns `false` if it already exists.
    pub fn add_provider(&self, provider: &str) -> bool {
        let mut records = self.write();
        if records.contains_key(provider) {
            return false;
        }
        records.insert(provider.to_string(), Arc::new(ProviderRecord::default()));
        info!(provider, "provider added");
        true
    }

    /// Delete a provider. References to it stop resolving.
    pub fn remove_provider(&self, provider: &str) -> bool {
        let removed = self.write().remove(provider).is_some();
        if removed {
            info!(provider, "provider removed");
        }
        removed
    }

    pub fn set_endpoint(&self, provider: &str, base_url: &str) {
        self.upsert(provider, |r| r.base_url = base_url.to_string());
    }

    pub fn set_credential(&self, provider: &str, credential: &str) {
        self.upsert(provider, |r| r.credential = credential.to_string());
    }

    /// Set the endpoint and the credential in one replacement.
    pub fn save_provider(&self, provider: &str, base_url: &str, credential: &str) {
        self.upsert(provider, |r| {
            r.base_url = base_url.to_string();
            r.credential = credential.to_string();
        });
        info!(provider, base_url, "provider saved");
    }

    // ────────────── Queries ──────────────

    /// Registered provider names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Snapshot of one record.
    pub fn get(&self, provider: &str) -> Option<Arc<ProviderRecord>> {
        self.read().get(provider).cloned()
    }

    /// Stored model list, without touching the network.
    pub fn models(&self, provider: &str) -> Vec<ModelDescriptor> {
        self.get(provider)
            .map(|r| r.models.clone())
            .unwrap_or_default()
    }

    /// Settings view of every record, for persistence.
    pub fn to_providers(&self) -> BTreeMap<String, ProviderEntry> {
        self.read()
            .iter()
            .map(|(name, record)| (name.clone(), ProviderEntry::from(record.as_ref())))
            .collect()
    }

    /// Look up the endpoint for a model reference.
    ///
    /// Fails with a configuration error unless the provider exists and both
    /// its base URL and credential are non-empty.
    pub fn resolve(&self, reference: &ModelReference) -> Result<ResolvedEndpoint> {
        self.resolve_provider(&reference.provider)
    }

    fn resolve_provider(&self, provider: &str) -> Result<ResolvedEndpoint> {
        let record = self.get(provider).ok_or_else(|| not_configured(provider))?;
        if record.base_url.trim().is_empty() || record.credential.trim().is_empty() {
            return Err(not_configured(provider));
        }
        Ok(ResolvedEndpoint {
            base_url: record.base_url.clone(),
            credential: record.credential.clone(),
        })
    }

    // ────────────── Network ──────────────

    /// Fetch `GET {base}/models` and store the result as the provider's list.
    pub async fn list_models(&self, provider: &str) -> Result<Vec<ModelDescriptor>> {
        let endpoint = self.resolve_provider(provider)?;
        let url = endpoint_url(&endpoint.base_url, "models");

        debug!(provider, url = %url, "fetching model list");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&endpoint.credential)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            warn!(provider, error = %err, "model list request failed");
            return Err(err);
        }

        let listing: ModelListResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("malformed model list: {e}")))?;

        let models: Vec<ModelDescriptor> = listing.data.into_iter().map(Into::into).collect();

        let mut records = self.write();
        match records.get(provider) {
            Some(current) => {
                let mut record = ProviderRecord::clone(current);
                record.models = models.clone();
                record.models_fetched_at = Some(Utc::now());
                records.insert(provider.to_string(), Arc::new(record));
                info!(provider, models = models.len(), "model list updated");
            }
            None => warn!(provider, "provider removed while fetching models, list not stored"),
        }

        Ok(models)
    }
}

fn not_configured(provider: &str) -> Error {
    Error::configuration(format!("provider not configured: {provider}"))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
