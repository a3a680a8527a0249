//! Cached project resolution

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::Config,
    keys::key_hint,
    project::probe::{ProbeOutcome, ResolutionError},
    routes::metrics::record_project_cache,
};

/// Resolves and caches the project id of each express key
///
/// Entries live for the whole process and are never replaced once stored.
/// Two concurrent misses for the same key may both probe; the first stored
/// answer wins.
pub struct ProjectResolver {
    client: reqwest::Client,
    base_url: String,
    probe_model: String,
    cache: RwLock<HashMap<String, String>>,
}

impl ProjectResolver {
    /// Create a new resolver
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.vertex_base_url.clone(),
            probe_model: config.probe_model.clone(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the project id for `key`, probing upstream on a cache miss
    #[instrument(skip_all, fields(key = %key_hint(key)))]
    pub async fn resolve(&self, key: &str) -> Result<String, ResolutionError> {
        if let Some(project_id) = self.cached(key) {
            debug!(project_id = %project_id, "Project cache hit");
            record_project_cache("hit");
            return Ok(project_id);
        }

        record_project_cache("miss");
        let outcome = self.probe(key).await.map_err(|e| {
            warn!(error = %e, "Project probe request failed");
            record_project_cache("error");
            e
        })?;

        match outcome.into_result() {
            Ok(project_id) => {
                let project_id = self.store(key, project_id);
                info!(project_id = %project_id, "Resolved project for express key");
                Ok(project_id)
            }
            Err(e) => {
                warn!(error = %e, "Could not resolve project for express key");
                record_project_cache("error");
                Err(e)
            }
        }
    }

    /// Look up a previously resolved project id
    pub fn cached(&self, key: &str) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of keys with a resolved project
    pub fn cached_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// URL of the project discovery probe for `key`
    pub fn probe_url(&self, key: &str) -> String {
        format!(
            "{}/v1/publishers/google/models/{}:generateContent?key={}",
            self.base_url, self.probe_model, key
        )
    }

    /// Send the probe and classify the answer
    async fn probe(&self, key: &str) -> Result<ProbeOutcome, reqwest::Error> {
        let response = self
            .client
            .post(self.probe_url(key))
            .header(CONTENT_TYPE, "application/json")
            .body("{}")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "Project probe answered");

        Ok(ProbeOutcome::classify(status, body))
    }

    /// Insert unless already present; returns the value that ends up cached
    fn store(&self, key: &str, project_id: String) -> String {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_insert(project_id)
            .clone()
    }
}
