//! Inbound request rewriting
//!
//! Rules are applied only when the body is a JSON object. Anything else is
//! forwarded byte for byte with the model path untouched.

use bytes::Bytes;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{IMAGE_PREVIEW_MODEL, LEGACY_IMAGE_MODEL};

/// Harm categories whose thresholds are forced open
const HARM_CATEGORIES: [&str; 8] = [
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_IMAGE_HATE",
    "HARM_CATEGORY_IMAGE_DANGEROUS_CONTENT",
    "HARM_CATEGORY_IMAGE_HARASSMENT",
    "HARM_CATEGORY_IMAGE_SEXUALLY_EXPLICIT",
];

const BLOCK_NONE: &str = "BLOCK_NONE";

/// Inbound body after a parse attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// Body is a JSON object and can be rewritten
    Json(Map<String, Value>),
    /// Not a JSON object; forwarded unchanged
    Raw(Bytes),
}

impl ParsedBody {
    /// Parse raw bytes, keeping them as-is unless they hold a JSON object
    pub fn parse(raw: Bytes) -> Self {
        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => ParsedBody::Json(map),
            Ok(_) => {
                debug!("Request body is JSON but not an object, forwarding as-is");
                ParsedBody::Raw(raw)
            }
            Err(e) => {
                debug!(error = %e, "Request body is not JSON, forwarding as-is");
                ParsedBody::Raw(raw)
            }
        }
    }
}

/// Model path and body ready to send upstream
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRequest {
    pub model_path: String,
    pub body: Bytes,
}

/// Rewrite a model path and request body for Vertex AI
pub fn transform_request(model_path: &str, raw: Bytes) -> TransformedRequest {
    let mut request = match ParsedBody::parse(raw) {
        ParsedBody::Json(map) => map,
        ParsedBody::Raw(body) => {
            return TransformedRequest {
                model_path: model_path.to_string(),
                body,
            }
        }
    };

    let model_path = model_path.replace(LEGACY_IMAGE_MODEL, IMAGE_PREVIEW_MODEL);

    let generation_config = request
        .entry("generationConfig")
        .or_insert_with(|| Value::Object(Map::new()));
    if model_path.contains(IMAGE_PREVIEW_MODEL) {
        // Image output needs a config object to carry the modalities
        if !generation_config.is_object() {
            *generation_config = Value::Object(Map::new());
        }
        if let Value::Object(config) = generation_config {
            config.remove("thinkingConfig");
            config.remove("responseMimeType");
            config.insert("responseModalities".to_string(), json!(["TEXT", "IMAGE"]));
        }
    }

    if let Some(Value::Array(contents)) = request.get_mut("contents") {
        for content in contents.iter_mut().filter_map(Value::as_object_mut) {
            content
                .entry("role")
                .or_insert_with(|| Value::String("user".to_string()));
        }
    }

    request.insert("safetySettings".to_string(), safety_settings());

    // Serializing a Map<String, Value> cannot fail
    let body = serde_json::to_vec(&request).unwrap_or_default();

    TransformedRequest {
        model_path,
        body: Bytes::from(body),
    }
}

/// Safety settings with every category set to block nothing
pub fn safety_settings() -> Value {
    Value::Array(
        HARM_CATEGORIES
            .iter()
            .map(|category| json!({ "category": category, "threshold": BLOCK_NONE }))
            .collect(),
    )
}
