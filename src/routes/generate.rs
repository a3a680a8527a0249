//! Gemini model endpoints
//!
//! - `POST /v1beta/models/{model_path}` - rotates through the configured
//!   express keys; guarded by the proxy API key
//! - `POST /frontend/v1beta/models/{model}:{operation}` - uses the caller's
//!   own express key from `x-vertex-express-key`

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, Method},
    response::Response,
};
use tracing::{error, info, trace};

use crate::{
    error::{AppError, AppResult},
    keys::key_hint,
    proxy::{headers::EXPRESS_KEY_HEADER, UpstreamCall},
    routes::metrics::record_request,
    transform::{is_streaming_operation, transform_request},
    AppState,
};

/// Rotating proxy endpoint
pub async fn proxy_generate(
    State(state): State<Arc<AppState>>,
    Path(model_path): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let start_time = Instant::now();
    let express_key = state.key_rotator.next();

    info!(
        model_path = %model_path,
        key = %key_hint(express_key),
        "Processing proxy request"
    );

    let result = call_model(&state, method, &headers, &model_path, express_key, body).await;
    finish("proxy", start_time, result)
}

/// Frontend endpoint keyed by the caller's own express key
///
/// Anything that goes wrong before an upstream answer exists is reported
/// as a generic 500 proxy error.
pub async fn frontend_generate(
    State(state): State<Arc<AppState>>,
    Path(model_op): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let start_time = Instant::now();

    let (model, operation) = split_model_operation(&model_op)
        .ok_or_else(|| AppError::NotFound(format!("Unknown model operation: {}", model_op)))?;

    let express_key = headers
        .get(EXPRESS_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", EXPRESS_KEY_HEADER)))?
        .to_string();

    let model_path = format!("{}:{}", model, operation);
    info!(
        model_path = %model_path,
        key = %key_hint(&express_key),
        "Processing frontend request"
    );

    let result = call_model(&state, method, &headers, &model_path, &express_key, body)
        .await
        .map_err(|e| {
            error!(error = %e, model_path = %model_path, "Frontend proxy error");
            e.into_proxy_error()
        });
    finish("frontend", start_time, result)
}

/// Split `{model}:{operation}` at the last colon
fn split_model_operation(model_op: &str) -> Option<(&str, &str)> {
    model_op
        .rsplit_once(':')
        .filter(|(model, operation)| !model.is_empty() && !operation.is_empty())
}

/// Resolve the key's project, rewrite the request and relay it
async fn call_model(
    state: &AppState,
    method: Method,
    headers: &HeaderMap,
    model_path: &str,
    express_key: &str,
    body: Bytes,
) -> AppResult<Response> {
    let project_id = state.project_resolver.resolve(express_key).await?;

    let transformed = transform_request(model_path, body);
    let streaming = is_streaming_operation(&transformed.model_path);
    trace!(body = %String::from_utf8_lossy(&transformed.body), "Request body after rewrite");

    state
        .vertex_relay
        .relay(
            method,
            headers,
            transformed.body,
            UpstreamCall {
                project_id: &project_id,
                express_key,
                model_path: &transformed.model_path,
                streaming,
            },
        )
        .await
}

/// Record metrics and log the outcome
fn finish(route: &str, start_time: Instant, result: AppResult<Response>) -> AppResult<Response> {
    let duration = start_time.elapsed().as_secs_f64();
    let status_label = match &result {
        Ok(response) if response.status().is_success() => "success",
        Ok(_) => "upstream_error",
        Err(_) => "error",
    };
    record_request(status_label, route, duration);

    if let Ok(response) = &result {
        info!(
            route,
            status = %response.status(),
            duration_ms = %format!("{:.2}", duration * 1000.0),
            "Relay request completed"
        );
    }

    result
}
