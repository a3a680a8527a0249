//! Unary response cleanup

use bytes::Bytes;
use serde_json::Value;

/// Drop empty parts from every candidate's content
///
/// Fails only when `body` is not valid JSON.
pub fn clean_response(body: &[u8]) -> Result<Bytes, serde_json::Error> {
    let mut response: Value = serde_json::from_slice(body)?;

    if let Some(Value::Array(candidates)) = response.get_mut("candidates") {
        for candidate in candidates.iter_mut() {
            if let Some(Value::Array(parts)) = candidate
                .get_mut("content")
                .and_then(|content| content.get_mut("parts"))
            {
                parts.retain(is_truthy);
            }
        }
    }

    Ok(Bytes::from(serde_json::to_vec(&response)?))
}

/// JSON truthiness: null, false, zero and empty containers are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
