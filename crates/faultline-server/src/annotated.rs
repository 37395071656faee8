//! Extractors whose rejections become validation faults

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::response::{IntoResponse, Response};
use faultline_core::path::BOOLEAN_ONLY_MARKER;
use faultline_core::{DecodeCause, DecodeFailure, ErrorResponse, Fault, Translator, TypeMismatch, ValidationFault};
use http::request::Parts;
use http::{StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::adapter::{Style, TransportAdapter, json_response, raised_response};

/// Body limit for decoded JSON requests (2 MiB)
const BODY_LIMIT_BYTES: usize = 2 << 20;

/// Prefix of the query rejection text produced by axum
const QUERY_REJECTION_PREFIX: &str = "Failed to deserialize query string: ";

/// Rejection of [`ValidJson`] and [`ValidQuery`]
#[derive(Debug)]
pub struct Rejection(pub Fault);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        raised_response(Style::Annotated, self.0)
    }
}

impl<F: Into<Fault>> From<F> for Rejection {
    fn from(fault: F) -> Self {
        Self(fault.into())
    }
}

/// JSON body extractor reporting field-level decode failures
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Rejection;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        if !is_json(&content_type) {
            return Err(Fault::unsupported_media_type(format!("Content type '{content_type}' not supported")).into());
        }

        let bytes = axum::body::to_bytes(request.into_body(), BODY_LIMIT_BYTES)
            .await
            .map_err(|err| {
                if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                    Fault::status(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes"),
                    )
                } else {
                    Fault::bad_request(format!("Failed to read request body: {err}"))
                }
            })?;

        decode_json(&bytes).map(Self).map_err(Rejection::from)
    }
}

/// Query string extractor reporting parameter conversion failures
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::try_from_uri(&parts.uri) {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => {
                let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
                    .map(|Query(pairs)| pairs)
                    .unwrap_or_default();
                Err(query_fault(&rejection.body_text(), &pairs).into())
            }
        }
    }
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Decode a JSON document, describing failures as a [`DecodeFailure`]
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Fault> {
    let deserializer = &mut serde_json::Deserializer::from_slice(bytes);

    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path: Vec<String> = err.path().iter().filter_map(segment_token).collect();
        let inner = err.into_inner();
        let raw = serde_json::from_slice::<Value>(bytes)
            .ok()
            .and_then(|document| value_at(&document, &path).cloned());

        let cause = decode_cause(&inner, raw);
        DecodeFailure::new(format!("JSON parse error: {inner}"), path, cause).into()
    })
}

fn segment_token(segment: &Segment) -> Option<String> {
    match segment {
        Segment::Seq { index } => Some(index.to_string()),
        Segment::Map { key } => Some(key.clone()),
        Segment::Enum { variant } => Some(variant.clone()),
        Segment::Unknown => None,
    }
}

fn value_at<'a>(document: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(document, |value, token| match value {
        Value::Array(items) => token.parse::<usize>().ok().and_then(|index| items.get(index)),
        Value::Object(fields) => fields.get(token),
        _ => None,
    })
}

/// Name the shape of a JSON decoding error
///
/// Data errors on a scalar are format errors, except a non-boolean string
/// in a boolean field (reported in the legacy boolean wording) and an
/// unknown enum variant (a value that could not be instantiated).
fn decode_cause(error: &serde_json::Error, raw: Option<Value>) -> DecodeCause {
    let message = error.to_string();

    if !error.is_data() {
        return DecodeCause::Other { message };
    }

    if message.contains("expected a boolean")
        && let Some(Value::String(literal)) = &raw
    {
        return DecodeCause::MismatchedInput {
            message: format!("Cannot deserialize value of type `boolean` from String \"{literal}\": {BOOLEAN_ONLY_MARKER}"),
        };
    }

    if message.starts_with("unknown variant") {
        return DecodeCause::ValueInstantiation { rejected: raw };
    }

    match raw {
        Some(value @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => DecodeCause::InvalidFormat { value },
        _ => DecodeCause::MismatchedInput { message },
    }
}

/// Turn axum's query rejection text into a validation fault
fn query_fault(rejection: &str, pairs: &[(String, String)]) -> Fault {
    let detail = rejection.strip_prefix(QUERY_REJECTION_PREFIX).unwrap_or(rejection);

    if let Some(name) = detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(name, _)| name)
    {
        return ValidationFault::MissingParameter(format!("Required request parameter '{name}' is not present")).into();
    }

    match detail.split_once(": ") {
        Some((name, reason)) if !name.is_empty() && name != "." => {
            let value = pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
                .unwrap_or_default();
            let message = format!("Failed to convert value '{value}' of parameter '{name}': {reason}");
            ValidationFault::TypeMismatch(TypeMismatch {
                name: name.to_owned(),
                value: Value::String(value),
                message,
            })
            .into()
        }
        _ => Fault::bad_request(detail.to_owned()),
    }
}

/// Adapter for [`ValidJson`] and [`ValidQuery`] rejections
#[derive(Debug, Clone)]
pub struct AnnotatedAdapter {
    translator: Arc<Translator>,
}

impl AnnotatedAdapter {
    pub const fn new(translator: Arc<Translator>) -> Self {
        Self { translator }
    }
}

impl TransportAdapter for AnnotatedAdapter {
    const STYLE: Style = Style::Annotated;

    fn translator(&self) -> &Translator {
        &self.translator
    }

    fn deliver(&self, response: &ErrorResponse) -> Response {
        json_response(response)
    }
}
