//! Proxy API key authentication
//!
//! Guards the rotating endpoint with the shared `PROXY_API_KEY`. The key may
//! arrive as the `key` query parameter or the `x-goog-api-key` header, the
//! same places Gemini clients already put their API key.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use crate::{error::AppError, proxy::headers::GOOG_API_KEY_HEADER, AppState};

/// Extract the `key` query parameter
pub fn extract_query_key(request: &Request) -> Option<String> {
    Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove("key"))
}

/// Extract the `x-goog-api-key` header
pub fn extract_header_key(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(GOOG_API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
}

/// Check a request against the configured proxy key
///
/// With no proxy key configured every request is allowed.
pub fn is_authorized(expected: Option<&str>, request: &Request) -> bool {
    let Some(expected) = expected else {
        return true;
    };

    extract_query_key(request).as_deref() == Some(expected)
        || extract_header_key(request) == Some(expected)
}

/// Authentication middleware
///
/// Rejects with 401 unless the query key or header key equals the
/// configured proxy key exactly.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn proxy_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !is_authorized(state.config.proxy_api_key.as_deref(), &request) {
        warn!("Rejected request with invalid or missing proxy API key");
        return Err(AppError::Unauthorized);
    }

    debug!("Proxy API key accepted");
    Ok(next.run(request).await)
}
