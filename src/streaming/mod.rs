//! Line-by-line relaying of streamed upstream responses
//!
//! Upstream SSE bytes arrive in chunks that need not align with line
//! boundaries. Complete lines are forwarded as soon as they are seen, in
//! arrival order, and the upstream response is dropped as soon as the
//! downstream body is dropped.

use std::time::Instant;

use async_stream::try_stream;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::routes::metrics::record_stream_release;

/// Buffer for accumulating incomplete lines across chunk boundaries.
///
/// Lines are split on `\n`; a trailing `\r` is removed and the line is
/// re-terminated with a single `\n`. Empty lines are kept since they
/// delimit SSE events.
///
/// # Example
/// ```
/// use vertex_relay::streaming::LineBuffer;
///
/// let mut buffer = LineBuffer::new();
///
/// let lines1 = buffer.feed(b"data: {\"text\":\"hel");
/// assert!(lines1.is_empty());
///
/// let lines2 = buffer.feed(b"lo\"}\r\n\r\n");
/// assert_eq!(lines2, vec![&b"data: {\"text\":\"hello\"}\n"[..], &b"\n"[..]]);
/// ```
#[derive(Debug, Default)]
pub struct LineBuffer {
    /// Accumulated incomplete line data
    incomplete: BytesMut,
}

impl LineBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self {
            incomplete: BytesMut::new(),
        }
    }

    /// Feed bytes into the buffer and return any complete lines.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Bytes> {
        self.incomplete.extend_from_slice(bytes);

        let mut complete_lines = Vec::new();
        while let Some(newline_pos) = self.incomplete.iter().position(|&b| b == b'\n') {
            let mut line = self.incomplete.split_to(newline_pos + 1);
            line.truncate(newline_pos);
            complete_lines.push(terminate(line));
        }

        complete_lines
    }

    /// Take whatever is left once the upstream body has ended.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.incomplete.is_empty() {
            None
        } else {
            let rest = self.incomplete.split();
            Some(terminate(rest))
        }
    }

    /// Check if there's any incomplete data remaining in the buffer.
    pub fn has_incomplete(&self) -> bool {
        !self.incomplete.is_empty()
    }
}

fn terminate(mut line: BytesMut) -> Bytes {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    line.extend_from_slice(b"\n");
    line.freeze()
}

/// Marks the end of an upstream stream, however it ends
///
/// Dropping the relay stream drops the upstream response, which returns or
/// closes its connection. The guard only reports how it ended.
struct StreamRelease {
    model_path: String,
    started: Instant,
    lines: u64,
    completed: bool,
}

impl Drop for StreamRelease {
    fn drop(&mut self) {
        let outcome = if self.completed { "completed" } else { "aborted" };
        debug!(
            model_path = %self.model_path,
            lines = self.lines,
            outcome,
            duration_ms = %format!("{:.2}", self.started.elapsed().as_secs_f64() * 1000.0),
            "Upstream stream released"
        );
        record_stream_release(outcome);
    }
}

/// Relay upstream bytes as a lazy sequence of complete lines
///
/// Nothing is read from upstream until the consumer polls, so backpressure
/// carries through and no more than one upstream chunk is held at a time.
pub fn relay_lines<S>(
    upstream: S,
    model_path: String,
) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Send
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    try_stream! {
        let mut release = StreamRelease {
            model_path,
            started: Instant::now(),
            lines: 0,
            completed: false,
        };
        let mut buffer = LineBuffer::new();
        let mut upstream = Box::pin(upstream);

        while let Some(chunk) = upstream.next().await {
            let chunk = chunk.map_err(|e| {
                warn!(model_path = %release.model_path, error = %e, "Upstream stream error");
                e
            })?;
            for line in buffer.feed(&chunk) {
                release.lines += 1;
                yield line;
            }
        }

        if buffer.has_incomplete() {
            debug!(model_path = %release.model_path, "Upstream ended mid-line, flushing remainder");
        }
        if let Some(rest) = buffer.finish() {
            release.lines += 1;
            yield rest;
        }
        release.completed = true;
    }
}
