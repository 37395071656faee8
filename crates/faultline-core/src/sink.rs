use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use crate::digest::StackDigest;
use crate::response::ErrorResponse;

/// Destination of translated faults on the operator side
///
/// Receives each response before redaction, so the entry always carries
/// `debugMessage`, together with the stack digest when one was produced.
pub trait LogSink: Send + Sync + Debug {
    fn record(&self, response: &ErrorResponse, digest: Option<&StackDigest>);
}

/// Emits translated faults as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, response: &ErrorResponse, digest: Option<&StackDigest>) {
        tracing::error!(
            id = %response.id(),
            status = response.status_code(),
            method = %response.method(),
            uri = %response.request_uri(),
            details = %render_response(response),
            "request failed"
        );

        if let Some(digest) = digest {
            tracing::error!(
                id = %digest.correlation_id,
                stack = %render_digest(digest),
                "request failed with stack"
            );
        }
    }
}

/// One entry captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub response: ErrorResponse,
    pub digest: Option<StackDigest>,
}

/// Keeps recorded entries in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LogSink for MemorySink {
    fn record(&self, response: &ErrorResponse, digest: Option<&StackDigest>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                response: response.clone(),
                digest: digest.cloned(),
            });
    }
}

/// Compact JSON form of a response for log lines
///
/// Falls back to a minimal object holding the debug text when
/// serialization fails.
pub fn render_response(response: &ErrorResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| {
        let details = response.debug_message().unwrap_or(response.message());
        format!("{{ \"errorDetails\" : {} }}", quote(details))
    })
}

/// Compact JSON form of a stack digest for log lines
pub fn render_digest(digest: &StackDigest) -> String {
    serde_json::to_string(digest)
        .unwrap_or_else(|_| format!("{{ \"stackTraceDetails\" : {} }}", quote(&digest.exception_summary)))
}

fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
