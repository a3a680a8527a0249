//! Express key management
//!
//! Holds the configured key pool and hands keys out round-robin.

pub mod rotator;

pub use rotator::KeyRotator;

/// Shorten a key for log output
pub fn key_hint(key: &str) -> String {
    let prefix: String = key.chars().take(6).collect();
    if prefix.len() < key.len() {
        format!("{prefix}...")
    } else {
        prefix
    }
}
