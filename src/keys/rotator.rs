//! Round-robin express key rotation

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};

/// Cycles through a fixed, non-empty set of express keys
///
/// The cursor advance is a single compare-and-swap, so concurrent callers
/// each receive a distinct position and the combined sequence is exactly
/// the configured order repeated.
#[derive(Debug)]
pub struct KeyRotator {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl KeyRotator {
    /// Create a rotator over the given keys
    pub fn new(keys: Vec<String>) -> Result<Self> {
        if keys.is_empty() {
            bail!("Key rotator requires at least one express key");
        }

        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Return the next key in cyclic order
    pub fn next(&self) -> &str {
        let len = self.keys.len();
        // The closure always returns Some, so both arms carry the previous value.
        let index = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
        {
            Ok(prev) | Err(prev) => prev,
        };
        &self.keys[index]
    }

    /// Number of keys in the pool
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the pool has no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
