//! Request and response rewriting
//!
//! Only a handful of Gemini fields are touched. Everything else in the
//! payload passes through as opaque JSON.

pub mod request;
pub mod response;

pub use request::{transform_request, ParsedBody, TransformedRequest};
pub use response::clean_response;

/// Legacy image model that upstream no longer serves
pub const LEGACY_IMAGE_MODEL: &str = "gemini-2.0-flash-exp-image-generation";

/// Image-capable model that replaces the legacy one
pub const IMAGE_PREVIEW_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Operation name that selects a streamed response
pub const STREAM_OPERATION: &str = "streamGenerateContent";

/// Whether a model path requests a streamed response
pub fn is_streaming_operation(model_path: &str) -> bool {
    model_path.contains(STREAM_OPERATION)
}
