//! Fault translation for request-serving services
//!
//! A [`Fault`] raised by a handler is classified, broken down into
//! field-level sub-errors and rendered as an [`ErrorResponse`]. The full
//! response and a bounded stack digest go to a [`LogSink`]; the caller gets
//! the same response with internal detail redacted.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod classify;
pub mod context;
pub mod digest;
pub mod extract;
pub mod fault;
pub mod path;
mod query;
pub mod response;
pub mod sink;
mod translate;

pub use classify::{Classification, classify};
pub use context::RequestContext;
pub use digest::{StackDigest, StackTraceDigester};
pub use extract::extract;
pub use fault::*;
pub use path::resolve_path;
pub use query::validate_query_parameter;
pub use response::{Clock, ErrorResponse, ErrorResponseBuilder, SubError, SystemClock, ValidationSubError};
pub use sink::{LogSink, MemorySink, TracingSink};
pub use translate::{Translator, finalize};
