//! Vertex Relay - Gemini-compatible reverse proxy for Vertex AI express keys
//!
//! This library provides the core functionality for the relay server. It
//! rotates requests across a pool of express keys, discovers the project
//! behind each key, rewrites requests for Vertex AI and relays unary and
//! streamed answers back to the caller.

pub mod config;
pub mod error;
pub mod keys;
pub mod middleware;
pub mod project;
pub mod proxy;
pub mod routes;
pub mod streaming;
pub mod transform;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

pub use crate::config::Config;
pub use crate::keys::KeyRotator;
pub use crate::project::ProjectResolver;
pub use crate::proxy::VertexRelay;

/// Application state shared across all request handlers
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub start_time: Instant,
    /// Round-robin pool for the rotating endpoint
    pub key_rotator: Arc<KeyRotator>,
    /// Process-lifetime cache of key to project id
    pub project_resolver: Arc<ProjectResolver>,
    /// Outbound client for model calls
    pub vertex_relay: Arc<VertexRelay>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Streams can stay open for minutes, so only the connect phase is bounded
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()?;

        Self::with_client(config, http_client)
    }

    /// Create application state around an existing HTTP client
    pub fn with_client(config: Config, http_client: reqwest::Client) -> Result<Self> {
        let key_rotator = Arc::new(KeyRotator::new(config.express_keys.clone())?);
        let project_resolver = Arc::new(ProjectResolver::new(http_client.clone(), &config));
        let vertex_relay = Arc::new(VertexRelay::new(http_client.clone(), &config));

        Ok(Self {
            config,
            http_client,
            start_time: Instant::now(),
            key_rotator,
            project_resolver,
            vertex_relay,
        })
    }
}
