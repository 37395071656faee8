//! Bounded, log-only summaries of fault backtraces

use std::backtrace::{Backtrace, BacktraceStatus};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::fault::Fault;

/// Leading frames kept in a digest
pub const KEPT_FRAMES: usize = 15;

/// Leading frames searched for an own-code frame when none was kept
pub const SEARCH_WINDOW: usize = 100;

/// One parsed backtrace frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    pub symbol: String,
    /// `file:line:column`, when debug info resolved it
    pub location: Option<String>,
}

impl Frame {
    pub fn new(index: usize, symbol: impl Into<String>) -> Self {
        Self {
            index,
            symbol: symbol.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    fn render(&self) -> String {
        match &self.location {
            Some(location) => format!("{} at {location}", self.symbol),
            None => self.symbol.clone(),
        }
    }
}

/// Log-side summary of a fault's backtrace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDigest {
    pub exception_summary: String,
    pub frames: Vec<String>,
    /// Same value as the response `id`
    pub correlation_id: String,
}

/// Parse the text form of a [`Backtrace`]
///
/// Each frame starts with `<index>: <symbol>` and may be followed by an
/// `at <location>` line. Inlined frames share an index and are kept as
/// separate entries.
pub fn parse_backtrace(text: &str) -> Vec<Frame> {
    fn frame_re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^\s*(\d+):\s+(.+?)\s*$").expect("must be valid regex"))
    }

    fn location_re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"^\s*at\s+(.+?)\s*$").expect("must be valid regex"))
    }

    let mut frames: Vec<Frame> = Vec::new();

    for line in text.lines() {
        if let Some(captures) = frame_re().captures(line) {
            let Ok(index) = captures[1].parse() else {
                continue;
            };
            frames.push(Frame::new(index, &captures[2]));
        } else if let Some(captures) = location_re().captures(line)
            && let Some(frame) = frames.last_mut()
            && frame.location.is_none()
        {
            frame.location = Some(captures[1].to_owned());
        }
    }

    frames
}

/// Produces [`StackDigest`] values
#[derive(Debug, Clone)]
pub struct StackTraceDigester {
    own_code_prefix: String,
    kept_frames: usize,
    search_window: usize,
}

impl StackTraceDigester {
    /// Digester with the default frame limits
    pub fn new(own_code_prefix: impl Into<String>) -> Self {
        Self::with_limits(own_code_prefix, KEPT_FRAMES, SEARCH_WINDOW)
    }

    pub fn with_limits(own_code_prefix: impl Into<String>, kept_frames: usize, search_window: usize) -> Self {
        Self {
            own_code_prefix: own_code_prefix.into(),
            kept_frames,
            search_window,
        }
    }

    /// Digest the backtrace of `fault`
    ///
    /// Returns `None` for faults that carry no backtrace. A backtrace that
    /// was not captured (`RUST_BACKTRACE` unset) yields a digest with no frames.
    pub fn digest(&self, fault: &Fault, correlation_id: &str) -> Option<StackDigest> {
        let backtrace = fault.backtrace()?;
        let frames = captured_frames(backtrace);
        let summary = format!("{}: {}", fault.category(), fault.debug_message());

        Some(self.digest_frames(summary, &frames, correlation_id))
    }

    /// Digest already-parsed frames
    ///
    /// Keeps the leading frames; when none of them is own code, the first
    /// own-code frame inside the search window is appended as one extra frame.
    pub fn digest_frames(&self, exception_summary: impl Into<String>, frames: &[Frame], correlation_id: &str) -> StackDigest {
        let kept = &frames[..frames.len().min(self.kept_frames)];
        let mut rendered: Vec<String> = kept.iter().map(Frame::render).collect();

        if !kept.iter().any(|frame| self.is_own_code(frame)) {
            let window = &frames[..frames.len().min(self.search_window)];
            if let Some(frame) = window.iter().skip(kept.len()).find(|frame| self.is_own_code(frame)) {
                rendered.push(frame.render());
            }
        }

        StackDigest {
            exception_summary: exception_summary.into(),
            frames: rendered,
            correlation_id: correlation_id.to_owned(),
        }
    }

    fn is_own_code(&self, frame: &Frame) -> bool {
        frame.symbol.contains(&self.own_code_prefix)
    }
}

fn captured_frames(backtrace: &Backtrace) -> Vec<Frame> {
    match backtrace.status() {
        BacktraceStatus::Captured => parse_backtrace(&backtrace.to_string()),
        _ => Vec::new(),
    }
}
