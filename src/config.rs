//! Configuration management for Vertex Relay
//!
//! Configuration is loaded from environment variables.

use anyhow::{bail, Context, Result};
use std::env;

/// Default upstream endpoint for Vertex AI express mode
pub const DEFAULT_VERTEX_BASE_URL: &str = "https://aiplatform.googleapis.com";

/// Model addressed by the project discovery probe
pub const DEFAULT_PROBE_MODEL: &str = "gemini-2.6-pro";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Shared secret required on the rotating endpoint. `None` leaves the proxy open.
    pub proxy_api_key: Option<String>,
    /// Express keys handed out round-robin (never empty)
    pub express_keys: Vec<String>,

    /// Vertex AI base URL, without trailing slash
    pub vertex_base_url: String,
    /// Model used by the project discovery probe
    pub probe_model: String,

    /// Connect timeout for upstream calls (in seconds). Reads are unbounded.
    pub connect_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let express_keys = parse_express_keys(
            &lookup("VERTEX_EXPRESS_KEYS").context("VERTEX_EXPRESS_KEYS must be set")?,
        );
        if express_keys.is_empty() {
            bail!("VERTEX_EXPRESS_KEYS must contain at least one key");
        }

        Ok(Self {
            host: lookup("RELAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("RELAY_PORT")
                .unwrap_or_else(|| "7860".to_string())
                .parse()
                .context("Invalid RELAY_PORT")?,

            proxy_api_key: lookup("PROXY_API_KEY").filter(|key| !key.is_empty()),
            express_keys,

            vertex_base_url: lookup("VERTEX_BASE_URL")
                .unwrap_or_else(|| DEFAULT_VERTEX_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            probe_model: lookup("PROJECT_PROBE_MODEL")
                .unwrap_or_else(|| DEFAULT_PROBE_MODEL.to_string()),

            connect_timeout_seconds: lookup("UPSTREAM_CONNECT_TIMEOUT_SECONDS")
                .unwrap_or_else(|| "30".to_string())
                .parse()
                .context("Invalid UPSTREAM_CONNECT_TIMEOUT_SECONDS")?,
        })
    }
}

/// Split a comma-separated key list, dropping blanks
fn parse_express_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
