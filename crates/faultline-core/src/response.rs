use std::fmt::Debug;

use http::{Method, StatusCode};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::Classification;
use crate::context::RequestContext;
use crate::fault::Fault;

/// Wire format of `timestamp`: UTC, second precision, no zone suffix
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Error payload returned to API callers
///
/// Fields are private: a response is only produced by
/// [`ErrorResponseBuilder`], and only redaction may change it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    id: String,
    #[serde(with = "method_text")]
    method: Method,
    request_uri: String,
    status_code: u16,
    timestamp: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    debug_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub_errors: Option<Vec<SubError>>,
}

impl ErrorResponse {
    /// Correlation id shared with the log entry
    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// `statusCode` as an HTTP status, falling back to 500 for values outside the valid range
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Stable, category-level description
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn debug_message(&self) -> Option<&str> {
        self.debug_message.as_deref()
    }

    pub fn sub_errors(&self) -> Option<&[SubError]> {
        self.sub_errors.as_deref()
    }

    /// Clear `debugMessage`
    pub(crate) fn redact(&mut self) {
        self.debug_message = None;
    }
}

/// Field-level detail attached to an [`ErrorResponse`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubError {
    Validation(ValidationSubError),
}

impl From<ValidationSubError> for SubError {
    fn from(error: ValidationSubError) -> Self {
        Self::Validation(error)
    }
}

/// A rejected field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSubError {
    /// Dotted path of the field, empty when unknown
    pub field: String,
    /// Serialized as `null` when absent
    pub rejected_value: Option<Value>,
    pub message: String,
}

impl ValidationSubError {
    pub fn new(field: impl Into<String>, rejected_value: Option<Value>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rejected_value: rejected_value.filter(|value| !value.is_null()),
            message: message.into(),
        }
    }
}

/// Source of response timestamps
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Timestamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Assembles [`ErrorResponse`] values
///
/// Pure apart from the clock and the id generator: the correlation id is the
/// request's trace id when one is present, otherwise a fresh v4 UUID.
#[derive(Debug, Clone, Default)]
pub struct ErrorResponseBuilder<C = SystemClock> {
    clock: C,
}

impl ErrorResponseBuilder {
    pub const fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> ErrorResponseBuilder<C> {
    /// Builder reading time from `clock`
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Build the response for `fault`
    ///
    /// Status and message come from `classification`; `debugMessage` is
    /// the fault's own message. Redaction is not applied here.
    pub fn build(
        &self,
        context: &RequestContext,
        classification: &Classification,
        sub_errors: Vec<SubError>,
        fault: &Fault,
    ) -> ErrorResponse {
        let id = context
            .trace_id()
            .map_or_else(|| uuid::Uuid::new_v4().to_string(), ToOwned::to_owned);

        ErrorResponse {
            id,
            method: context.method().clone(),
            request_uri: context.request_uri().to_owned(),
            status_code: classification.status.as_u16(),
            timestamp: self.clock.now().strftime(TIMESTAMP_FORMAT).to_string(),
            message: classification.description.to_string(),
            debug_message: Some(fault.debug_message()),
            sub_errors: (!sub_errors.is_empty()).then_some(sub_errors),
        }
    }
}

mod method_text {
    use http::Method;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let text = String::deserialize(deserializer)?;
        Method::from_bytes(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}
