use std::sync::Arc;

use crate::classify::{Classification, classify};
use crate::context::RequestContext;
use crate::digest::StackTraceDigester;
use crate::extract::extract;
use crate::fault::{BadRequest, Fault};
use crate::response::{ErrorResponse, ErrorResponseBuilder};
use crate::sink::LogSink;

/// Turns faults into caller-facing responses and operator-facing log entries
///
/// Shared by every transport adapter. The sink and digester are fixed at
/// construction and the translator holds no per-request state, so one
/// instance serves all requests concurrently.
#[derive(Debug, Clone)]
pub struct Translator {
    builder: ErrorResponseBuilder,
    digester: StackTraceDigester,
    sink: Arc<dyn LogSink>,
}

impl Translator {
    pub fn new(digester: StackTraceDigester, sink: Arc<dyn LogSink>) -> Self {
        Self {
            builder: ErrorResponseBuilder::new(),
            digester,
            sink,
        }
    }

    /// Translate `fault` raised while serving `context`
    ///
    /// Never fails. The sink sees the full response; the returned one has
    /// `debugMessage` cleared when the classification asks for it.
    pub fn translate(&self, fault: &Fault, context: &RequestContext) -> ErrorResponse {
        if let Fault::BadRequest(BadRequest {
            prebuilt: Some(prebuilt), ..
        }) = fault
        {
            self.sink.record(prebuilt, None);
            return (**prebuilt).clone();
        }

        let classification = classify(fault);
        let sub_errors = extract(fault);
        let response = self.builder.build(context, &classification, sub_errors, fault);
        let digest = self.digester.digest(fault, response.id());

        tracing::debug!(
            id = %response.id(),
            category = %fault.category(),
            status = response.status_code(),
            redact = classification.redact,
            "translated fault"
        );

        self.sink.record(&response, digest.as_ref());

        finalize(response, &classification)
    }
}

/// Apply the redaction policy
///
/// Must be the last change made to a response.
pub fn finalize(mut response: ErrorResponse, classification: &Classification) -> ErrorResponse {
    if classification.redact {
        response.redact();
    }
    response
}
