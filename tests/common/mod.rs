//! Common test utilities for Vertex Relay
//!
//! This module provides shared test fixtures and helper functions used
//! across the integration tests.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::Path,
    http::{header, StatusCode},
    response::Response,
    routing::post,
    Json, Router,
};
use axum_test::TestServer;
use vertex_relay::{routes, AppState, Config};

use crate::mocks::{MockVertex, VertexTestData, PROBE_MODEL};

/// Test configuration constants
pub mod constants {
    /// First express key in the pool
    pub const KEY_1: &str = "express-key-1";
    /// Second express key in the pool
    pub const KEY_2: &str = "express-key-2";
    /// Project behind KEY_1
    pub const PROJECT_1: &str = "project-1001";
    /// Project behind KEY_2
    pub const PROJECT_2: &str = "project-2002";
    /// Proxy API key when auth is enabled
    pub const PROXY_SECRET: &str = "S";
    /// Default model call used by tests
    pub const GENERATE: &str = "gemini-2.5-pro:generateContent";
    /// Streaming model call used by tests
    pub const STREAM_GENERATE: &str = "gemini-2.5-pro:streamGenerateContent";
}

/// Build a config pointing at a mock upstream
pub fn test_config(vertex_url: &str, keys: &[&str], proxy_api_key: Option<&str>) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        proxy_api_key: proxy_api_key.map(str::to_string),
        express_keys: keys.iter().map(|k| k.to_string()).collect(),
        vertex_base_url: vertex_url.to_string(),
        probe_model: PROBE_MODEL.to_string(),
        connect_timeout_seconds: 5,
    }
}

/// Test harness wiring the real router to a mock Vertex upstream
///
/// # Example
///
/// ```ignore
/// let harness = RelayTestHarness::new().await;
/// harness.vertex.mock_project_probe(KEY_1, PROJECT_1).await;
///
/// let response = harness.server
///     .post("/v1beta/models/gemini-2.5-pro:generateContent")
///     .json(&json!({"contents": []}))
///     .await;
/// ```
pub struct RelayTestHarness {
    pub server: TestServer,
    pub vertex: MockVertex,
    pub state: Arc<AppState>,
}

impl RelayTestHarness {
    /// Open proxy with a single key
    pub async fn new() -> Self {
        Self::with_options(&[constants::KEY_1], None).await
    }

    /// Harness with a custom key pool and optional proxy key
    pub async fn with_options(keys: &[&str], proxy_api_key: Option<&str>) -> Self {
        let vertex = MockVertex::start().await;
        let config = test_config(&vertex.uri(), keys, proxy_api_key);
        let state = Arc::new(
            AppState::with_client(config, reqwest::Client::new())
                .expect("Failed to create app state"),
        );
        let app = routes::create_router(state.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            vertex,
            state,
        }
    }
}

/// Serve the relay on a real socket, for tests that watch chunk timing
pub async fn spawn_relay(state: Arc<AppState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind relay listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let app = routes::create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Relay server failed");
    });

    addr
}

/// Sets a flag when dropped
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Upstream whose streaming endpoint emits `chunks` with `delay` before
/// each one, then repeats a heartbeat forever when `endless` is set.
///
/// Returns the base URL and a flag that turns true once the upstream body
/// stream has been dropped.
pub async fn spawn_slow_upstream(
    project: &'static str,
    chunks: Vec<&'static str>,
    delay: Duration,
    endless: bool,
) -> (String, Arc<AtomicBool>) {
    let released = Arc::new(AtomicBool::new(false));
    let released_for_handler = released.clone();

    let probe = move |Path(_model): Path<String>| async move {
        (
            StatusCode::NOT_FOUND,
            Json(VertexTestData::probe_not_found(project)),
        )
    };

    let generate = move |Path((_project, _model)): Path<(String, String)>| {
        let released = released_for_handler.clone();
        let chunks = chunks.clone();
        async move {
            let body = async_stream::stream! {
                let _guard = DropFlag(released);
                for chunk in chunks {
                    tokio::time::sleep(delay).await;
                    yield Ok::<_, Infallible>(Bytes::from_static(chunk.as_bytes()));
                }
                if endless {
                    loop {
                        tokio::time::sleep(delay).await;
                        yield Ok::<_, Infallible>(Bytes::from_static(b"data: {}\n\n"));
                    }
                }
            };

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/event-stream")
                .body(Body::from_stream(body))
                .expect("Failed to build upstream response")
        }
    };

    let app = Router::new()
        .route("/v1/publishers/google/models/:model", post(probe))
        .route(
            "/v1/projects/:project/locations/global/publishers/google/models/:model",
            post(generate),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind upstream listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Upstream server failed");
    });

    (format!("http://{}", addr), released)
}
