//! Mock Vertex AI for testing
//!
//! Provides wiremock-based mocks for the two upstream endpoints the relay uses:
//! - POST /v1/publishers/google/models/{model}:generateContent - project probe
//! - POST /v1/projects/{project}/locations/global/publishers/google/models/{model_path}
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::mocks::vertex::{MockVertex, VertexTestData};
//!
//! #[tokio::test]
//! async fn test_with_vertex_mock() {
//!     let vertex = MockVertex::start().await;
//!     vertex.mock_project_probe("key-1", "project-1").await;
//!     vertex
//!         .mock_model_success("project-1", "gemini-2.5-pro:generateContent", VertexTestData::text_response("hi"))
//!         .await;
//!
//!     // Use vertex.uri() as VERTEX_BASE_URL
//! }
//! ```

use serde_json::{json, Value};
use wiremock::{
    matchers::{header_exists, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Model addressed by the relay's project probe
pub const PROBE_MODEL: &str = "gemini-2.6-pro";

/// Mock Vertex AI server wrapper
pub struct MockVertex {
    server: MockServer,
}

impl MockVertex {
    /// Start a new mock Vertex server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the mock server URI
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Get all received requests (for assertion in tests)
    pub async fn received_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Requests that hit the project probe endpoint
    pub async fn probe_requests(&self) -> Vec<wiremock::Request> {
        self.received_requests()
            .await
            .into_iter()
            .filter(|r| r.url.path() == probe_path())
            .collect()
    }

    /// Requests that hit a project-scoped model endpoint
    pub async fn model_requests(&self) -> Vec<wiremock::Request> {
        self.received_requests()
            .await
            .into_iter()
            .filter(|r| r.url.path().starts_with("/v1/projects/"))
            .collect()
    }

    // =========================================================================
    // Project probe
    // =========================================================================

    /// Answer the probe for `key` with a 404 naming `project`, exactly once
    pub async fn mock_project_probe(&self, key: &str, project: &str) {
        Mock::given(method("POST"))
            .and(path(probe_path()))
            .and(query_param("key", key))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(VertexTestData::probe_not_found(project)),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Answer every probe with a custom status and body
    pub async fn mock_probe_failure(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(probe_path()))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Model calls
    // =========================================================================

    /// Mock a successful JSON model response
    pub async fn mock_model_success(&self, project: &str, model_path: &str, body: Value) {
        self.mock_model_response(
            project,
            model_path,
            ResponseTemplate::new(200)
                .set_body_json(body)
                .insert_header("x-vertex-trace", "trace-1"),
        )
        .await;
    }

    /// Mock a streamed SSE model response
    pub async fn mock_model_stream(&self, project: &str, model_path: &str, sse: &str) {
        self.mock_model_response(
            project,
            model_path,
            ResponseTemplate::new(200)
                .set_body_raw(sse.as_bytes().to_vec(), "text/event-stream"),
        )
        .await;
    }

    /// Answer model calls that advertise `accept-encoding` with a gzip body
    ///
    /// Takes precedence over the other model mocks, so a relay that forwards
    /// the header gets bytes it cannot parse.
    pub async fn mock_model_compressed(&self, project: &str, model_path: &str) {
        Mock::given(method("POST"))
            .and(path(model_call_path(project, model_path)))
            .and(header_exists("accept-encoding"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(VertexTestData::gzip_member(), "application/json")
                    .insert_header("content-encoding", "gzip"),
            )
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Mock an arbitrary response for a model call
    pub async fn mock_model_response(
        &self,
        project: &str,
        model_path: &str,
        response: ResponseTemplate,
    ) {
        Mock::given(method("POST"))
            .and(path(model_call_path(project, model_path)))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }
}

/// Path of the project probe
pub fn probe_path() -> String {
    format!("/v1/publishers/google/models/{}:generateContent", PROBE_MODEL)
}

/// Path of a project-scoped model call
pub fn model_call_path(project: &str, model_path: &str) -> String {
    format!(
        "/v1/projects/{}/locations/global/publishers/google/models/{}",
        project, model_path
    )
}

/// Sample upstream payloads
pub struct VertexTestData;

impl VertexTestData {
    /// 404 body returned by the probe, embedding the project id
    pub fn probe_not_found(project: &str) -> Value {
        json!({
            "error": {
                "code": 404,
                "message": format!(
                    "Publisher Model `projects/{}/locations/global/publishers/google/models/{}` was not found or your project does not have access to it.",
                    project, PROBE_MODEL
                ),
                "status": "NOT_FOUND"
            }
        })
    }

    /// Plain text candidate
    pub fn text_response(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 1, "totalTokenCount": 4}
        })
    }

    /// Candidate whose parts include empty fragments
    pub fn response_with_empty_parts() -> Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": ["", {"text": "hi"}, null]},
                "finishReason": "STOP"
            }]
        })
    }

    /// Leading bytes of a gzip member; never valid JSON or SSE
    pub fn gzip_member() -> Vec<u8> {
        vec![0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xab, 0x56, 0x4a]
    }

    /// Three-event SSE stream
    pub fn sse_stream() -> &'static str {
        concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"A\"}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"B\"}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"C\"}]}}]}\r\n\r\n",
        )
    }
}
