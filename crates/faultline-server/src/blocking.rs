use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use faultline_core::{ErrorResponse, Fault, Translator};
use http::{Method, StatusCode, Uri};

use crate::adapter::{Style, TransportAdapter, json_response, raised_response};

/// Result type for handlers written in the blocking style
pub type HandlerResult<T> = Result<T, HandlerError>;

/// Error returned by blocking-style handlers
///
/// Anything convertible into a [`Fault`] converts into this, so handlers
/// propagate with `?`.
#[derive(Debug)]
pub struct HandlerError(pub Fault);

impl<E> From<E> for HandlerError
where
    E: Into<Fault>,
{
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        raised_response(Style::Blocking, self.0)
    }
}

/// Adapter for handlers returning [`HandlerResult`]
#[derive(Debug, Clone)]
pub struct BlockingAdapter {
    translator: Arc<Translator>,
}

impl BlockingAdapter {
    pub const fn new(translator: Arc<Translator>) -> Self {
        Self { translator }
    }
}

impl TransportAdapter for BlockingAdapter {
    const STYLE: Style = Style::Blocking;

    fn translator(&self) -> &Translator {
        &self.translator
    }

    fn deliver(&self, response: &ErrorResponse) -> Response {
        json_response(response)
    }
}

/// Fallback for requests no route matched
pub async fn no_route(method: Method, uri: Uri) -> HandlerError {
    HandlerError(Fault::status(
        StatusCode::NOT_FOUND,
        format!("No endpoint {method} {}.", uri.path()),
    ))
}

/// Fallback for routes that exist but not for this method
pub async fn method_not_allowed(method: Method) -> HandlerError {
    HandlerError(Fault::status(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("Request method '{method}' is not supported"),
    ))
}
