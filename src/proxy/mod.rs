//! Proxy module
//!
//! Handles request forwarding to Vertex AI.

pub mod headers;
pub mod vertex;

pub use vertex::{UpstreamCall, VertexRelay};
