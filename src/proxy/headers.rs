//! Header utilities for relaying to Vertex AI
//!
//! Credential-bearing headers from the caller never reach upstream; the
//! express key travels in the query string instead.

use axum::http::header::{self, HeaderMap, HeaderName};

/// Hop-by-hop headers that must never be forwarded
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Proxy API key header
pub const GOOG_API_KEY_HEADER: &str = "x-goog-api-key";

/// Caller-supplied express key header on the frontend endpoint
pub const EXPRESS_KEY_HEADER: &str = "x-vertex-express-key";

/// Check if a header is a hop-by-hop header that should not be forwarded
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name)
}

/// Check if a caller header must be dropped before the upstream call
fn is_stripped_request_header(name: &HeaderName) -> bool {
    *name == header::HOST
        || *name == header::AUTHORIZATION
        || *name == header::CONTENT_LENGTH
        // The client has no decompression; upstream must answer in identity
        || *name == header::ACCEPT_ENCODING
        || name.as_str() == GOOG_API_KEY_HEADER
        || name.as_str() == EXPRESS_KEY_HEADER
        || is_hop_by_hop_header(name)
}

/// Copy caller headers that are safe to forward upstream
pub fn filter_request_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();

    for (name, value) in incoming {
        if !is_stripped_request_header(name) {
            filtered.append(name.clone(), value.clone());
        }
    }

    filtered
}

/// Filter hop-by-hop headers from an upstream response
///
/// `content-length` is dropped as well; the server recomputes it for the
/// buffered body.
pub fn filter_response_headers(response_headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();

    for (name, value) in response_headers {
        if !is_hop_by_hop_header(name) && *name != header::CONTENT_LENGTH {
            filtered.append(name.clone(), value.clone());
        }
    }

    filtered
}
