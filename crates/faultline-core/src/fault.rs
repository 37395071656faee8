use std::backtrace::Backtrace;
use std::fmt;

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::response::ErrorResponse;

/// A fault raised while handling a request
///
/// Every variant is one classification category and carries the payload
/// that category needs. Anything that does not fit a known category is
/// expressed as [`Fault::Internal`], usually through `From<anyhow::Error>`.
#[derive(Debug, Error)]
pub enum Fault {
    /// Requested data does not exist
    #[error("{0}")]
    NotFound(String),

    /// Requested resource does not exist
    #[error("{0}")]
    ResourceNotFound(String),

    /// Data being created already exists
    #[error("{0}")]
    Duplicate(String),

    /// Caller is not authenticated
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is authenticated but not allowed
    #[error("{0}")]
    Forbidden(String),

    /// Request is malformed in a way the handler detected itself
    #[error("{}", .0.message)]
    BadRequest(BadRequest),

    /// Request failed binding, decoding or constraint validation
    #[error(transparent)]
    Validation(#[from] ValidationFault),

    /// Request body has a content type the handler does not accept
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// Explicit status raised by routing (unknown route, wrong method)
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// A downstream HTTP dependency answered with an error
    #[error(transparent)]
    Upstream(#[from] UpstreamFailure),

    /// Anything else
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Fault {
    /// Data-not-found fault
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Resource-not-found fault
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::ResourceNotFound(message.into())
    }

    /// Duplicate-data fault
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate(message.into())
    }

    /// Unauthorized fault
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Forbidden fault
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Bad-request fault with the default description
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(BadRequest::new(message))
    }

    /// Unsupported-media-type fault
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::UnsupportedMediaType(message.into())
    }

    /// Fault carrying an explicit status
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Internal fault from a plain message
    pub fn internal(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Internal(anyhow::Error::msg(message))
    }

    /// Category this fault classifies under
    pub const fn category(&self) -> FaultCategory {
        match self {
            Self::NotFound(_) => FaultCategory::NotFound,
            Self::ResourceNotFound(_) => FaultCategory::ResourceNotFound,
            Self::Duplicate(_) => FaultCategory::Duplicate,
            Self::Unauthorized(_) => FaultCategory::Unauthorized,
            Self::Forbidden(_) => FaultCategory::Forbidden,
            Self::BadRequest(_) => FaultCategory::BadRequest,
            Self::Validation(_) => FaultCategory::Validation,
            Self::UnsupportedMediaType(_) => FaultCategory::UnsupportedMediaType,
            Self::Status { .. } => FaultCategory::Status,
            Self::Upstream(_) => FaultCategory::Upstream,
            Self::Internal(_) => FaultCategory::Internal,
        }
    }

    /// The fault's own message as it appears in `debugMessage`
    ///
    /// Upstream failures include the downstream response body so the log
    /// entry carries everything the dependency said.
    pub fn debug_message(&self) -> String {
        match self {
            Self::Upstream(upstream) => match upstream.body.as_deref() {
                Some(body) => format!("{}, response body is {body}", upstream.message),
                None => upstream.message.clone(),
            },
            other => other.to_string(),
        }
    }

    /// Captured backtrace, for the faults whose stack is worth logging
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Self::Internal(error) => Some(error.backtrace()),
            Self::Upstream(upstream) => Some(&upstream.backtrace),
            Self::Validation(ValidationFault::Decode(decode)) => Some(&decode.backtrace),
            _ => None,
        }
    }
}

/// Fieldless view of [`Fault`] used for logging and metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCategory {
    NotFound,
    ResourceNotFound,
    Duplicate,
    Unauthorized,
    Forbidden,
    BadRequest,
    Validation,
    UnsupportedMediaType,
    Status,
    Upstream,
    Internal,
}

impl FaultCategory {
    /// Stable label
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ResourceNotFound => "resource_not_found",
            Self::Duplicate => "duplicate",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::BadRequest => "bad_request",
            Self::Validation => "validation",
            Self::UnsupportedMediaType => "unsupported_media_type",
            Self::Status => "status",
            Self::Upstream => "upstream",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a bad-request fault
#[derive(Debug)]
pub struct BadRequest {
    pub message: String,
    /// Replaces the default "Bad Request" description
    pub description: Option<String>,
    /// Response assembled by the handler itself, returned as-is
    pub prebuilt: Option<Box<ErrorResponse>>,
}

impl BadRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            description: None,
            prebuilt: None,
        }
    }

    /// Override the description shown to the caller
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<BadRequest> for Fault {
    fn from(bad_request: BadRequest) -> Self {
        Self::BadRequest(bad_request)
    }
}

impl From<ErrorResponse> for Fault {
    /// Bad-request fault wrapping a handler-built response
    fn from(response: ErrorResponse) -> Self {
        Self::BadRequest(BadRequest {
            message: response.debug_message().map(str::to_owned).unwrap_or_default(),
            description: None,
            prebuilt: Some(Box::new(response)),
        })
    }
}

/// Validation-style faults raised by binding, decoding or constraint checks
#[derive(Debug, Error)]
pub enum ValidationFault {
    /// Constraint validation of an object or a method call failed
    #[error("{}", describe_violations(.0))]
    Constraint(Vec<ConstraintViolation>),

    /// Binding request data onto an object failed
    #[error("binding of '{}' failed with {} error(s)", .0.object_name, .0.error_count())]
    Bind(BindErrors),

    /// A single parameter could not be converted to its target type
    #[error("{}", .0.message)]
    TypeMismatch(TypeMismatch),

    /// A mandatory request parameter or header was not supplied
    #[error("{0}")]
    MissingParameter(String),

    /// The request body could not be decoded
    #[error("{}", .0.message)]
    Decode(DecodeFailure),
}

fn describe_violations(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(|violation| {
            let path = violation
                .path
                .iter()
                .map(|node| node.name.as_str())
                .collect::<Vec<_>>()
                .join(".");
            format!("{path}: {}", violation.message)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// One failed constraint
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Property path from the validated root, outermost node first
    pub path: Vec<PathNode>,
    pub invalid_value: Value,
    pub message: String,
}

/// Segment of a constraint property path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNode {
    pub name: String,
    pub kind: NodeKind,
}

impl PathNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// A bean property segment
    pub fn property(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Property)
    }

    /// A method parameter segment
    pub fn parameter(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Parameter)
    }
}

/// What a [`PathNode`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Bean,
    Property,
    Method,
    Constructor,
    Parameter,
    CrossParameter,
    ReturnValue,
    ContainerElement,
}

impl NodeKind {
    /// Whether a segment of this kind names a field the caller sent
    pub const fn names_field(self) -> bool {
        matches!(self, Self::Property | Self::Parameter)
    }
}

/// Outcome of binding request data onto an object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindErrors {
    pub object_name: String,
    pub field_errors: Vec<FieldError>,
    /// Object-level errors not tied to one field
    pub global_errors: Vec<String>,
}

impl BindErrors {
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_field_error(mut self, error: FieldError) -> Self {
        self.field_errors.push(error);
        self
    }

    #[must_use]
    pub fn with_global_error(mut self, message: impl Into<String>) -> Self {
        self.global_errors.push(message.into());
        self
    }

    pub fn error_count(&self) -> usize {
        self.field_errors.len() + self.global_errors.len()
    }
}

/// A binding failure on one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub rejected_value: Value,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, rejected_value: impl Into<Value>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rejected_value: rejected_value.into(),
            message: message.into(),
        }
    }
}

/// A parameter whose literal value could not be converted
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMismatch {
    /// Parameter name
    pub name: String,
    /// The literal offending value
    pub value: Value,
    pub message: String,
}

impl TypeMismatch {
    /// Describe a failed conversion of `value` into `required_type`
    pub fn new(name: impl Into<String>, value: impl Into<Value>, required_type: &str) -> Self {
        let name = name.into();
        let value = value.into();
        let literal = match &value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let message = format!("Failed to convert value '{literal}' of parameter '{name}' to required type '{required_type}'");
        Self { name, value, message }
    }
}

/// A request body that could not be decoded
///
/// `path` holds the field references traversed when decoding stopped,
/// outermost first.
#[derive(Debug)]
pub struct DecodeFailure {
    pub message: String,
    pub path: Vec<String>,
    pub cause: DecodeCause,
    pub backtrace: Backtrace,
}

impl DecodeFailure {
    pub fn new(message: impl Into<String>, path: Vec<String>, cause: DecodeCause) -> Self {
        Self {
            message: message.into(),
            path,
            cause,
            backtrace: Backtrace::capture(),
        }
    }
}

impl From<DecodeFailure> for Fault {
    fn from(failure: DecodeFailure) -> Self {
        Self::Validation(ValidationFault::Decode(failure))
    }
}

/// The nested cause recorded by the decoder
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeCause {
    /// A value was present but had the wrong textual format
    InvalidFormat { value: Value },
    /// Input did not match the expected shape
    MismatchedInput { message: String },
    /// A value could be read but not turned into the target type
    ValueInstantiation { rejected: Option<Value> },
    /// Anything else (syntax errors, missing fields)
    Other { message: String },
}

impl DecodeCause {
    /// Message text carried by the cause, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::MismatchedInput { message } | Self::Other { message } => Some(message),
            Self::InvalidFormat { .. } | Self::ValueInstantiation { .. } => None,
        }
    }
}

/// A downstream HTTP call that came back with an error status
#[derive(Debug)]
pub struct UpstreamFailure {
    pub status: StatusCode,
    pub message: String,
    pub body: Option<String>,
    pub backtrace: Backtrace,
}

impl UpstreamFailure {
    pub fn new(status: StatusCode, message: impl Into<String>, body: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            body,
            backtrace: Backtrace::capture(),
        }
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// No `provide`: the backtrace is read through `Fault::backtrace`.
impl std::error::Error for UpstreamFailure {}
