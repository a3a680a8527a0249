//! Vertex AI relay
//!
//! Sends the rewritten request to the project-scoped Vertex endpoint and
//! turns the upstream answer into the response for the caller.

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Response, StatusCode};
use bytes::Bytes;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    keys::key_hint,
    proxy::headers::{filter_request_headers, filter_response_headers},
    streaming::relay_lines,
    transform::clean_response,
};

/// Where a single model call goes
#[derive(Debug, Clone, Copy)]
pub struct UpstreamCall<'a> {
    pub project_id: &'a str,
    pub express_key: &'a str,
    pub model_path: &'a str,
    pub streaming: bool,
}

/// Client for project-scoped Vertex AI model endpoints
pub struct VertexRelay {
    client: reqwest::Client,
    base_url: String,
}

impl VertexRelay {
    /// Create a new relay
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.vertex_base_url.clone(),
        }
    }

    /// Build the upstream URL for a model call
    pub fn target_url(
        &self,
        project_id: &str,
        model_path: &str,
        express_key: &str,
        streaming: bool,
    ) -> String {
        let mut url = format!(
            "{}/v1/projects/{}/locations/global/publishers/google/models/{}?key={}",
            self.base_url, project_id, model_path, express_key
        );
        if streaming {
            url.push_str("&alt=sse");
        }
        url
    }

    /// Forward a request and relay the answer
    ///
    /// Non-200 answers are returned verbatim. A 200 is either streamed line
    /// by line or buffered and cleaned, depending on `call.streaming`.
    #[instrument(
        skip_all,
        fields(method = %method, model_path = %call.model_path, key = %key_hint(call.express_key))
    )]
    pub async fn relay(
        &self,
        method: Method,
        incoming_headers: &HeaderMap,
        body: Bytes,
        call: UpstreamCall<'_>,
    ) -> AppResult<Response<Body>> {
        let url = self.target_url(
            call.project_id,
            call.model_path,
            call.express_key,
            call.streaming,
        );
        let headers = filter_request_headers(incoming_headers);

        debug!(
            project_id = %call.project_id,
            streaming = call.streaming,
            body_len = body.len(),
            "Sending request to Vertex AI"
        );

        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to Vertex AI");
                e
            })?;

        let status = response.status();
        info!(status = %status, "Received response from Vertex AI");

        if status != StatusCode::OK {
            return passthrough_error(response).await;
        }

        if call.streaming {
            stream_response(response, call.model_path)
        } else {
            unary_response(response).await
        }
    }
}

/// Relay a non-200 answer with its status, headers and body untouched
async fn passthrough_error(response: reqwest::Response) -> AppResult<Response<Body>> {
    let status = response.status();
    let headers = filter_response_headers(response.headers());
    let body = response.bytes().await?;

    warn!(status = %status, body_len = body.len(), "Relaying upstream error response");

    let mut relayed = Response::new(Body::from(body));
    *relayed.status_mut() = status;
    *relayed.headers_mut() = headers;
    Ok(relayed)
}

/// Relay a 200 stream as it arrives
fn stream_response(response: reqwest::Response, model_path: &str) -> AppResult<Response<Body>> {
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
    let lines = relay_lines(response.bytes_stream(), model_path.to_string());

    let mut builder = Response::builder().status(StatusCode::OK);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder
        .body(Body::from_stream(lines))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
}

/// Buffer a 200 answer and drop empty content parts
async fn unary_response(response: reqwest::Response) -> AppResult<Response<Body>> {
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
    let body = response.bytes().await?;

    let body = match clean_response(&body) {
        Ok(cleaned) => cleaned,
        Err(e) => {
            warn!(error = %e, body_len = body.len(), "Upstream success body is not JSON, relaying as-is");
            body
        }
    };

    let mut relayed = Response::new(Body::from(body));
    if let Some(content_type) = content_type {
        relayed.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    Ok(relayed)
}
