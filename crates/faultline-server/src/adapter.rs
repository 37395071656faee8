use std::fmt;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use faultline_core::{ErrorResponse, Fault, RequestContext, Translator, classify};

use crate::request_context::context_of;

/// Request-handling style a fault was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Blocking,
    Reactive,
    Annotated,
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Blocking => "blocking",
            Self::Reactive => "reactive",
            Self::Annotated => "annotated",
        })
    }
}

/// Bridge between one handling style and the shared translator
pub trait TransportAdapter: Send + Sync + 'static {
    /// Faults raised in this style are handled by this adapter
    const STYLE: Style;

    fn translator(&self) -> &Translator;

    /// Turn a fault into the response entity
    fn translate(&self, fault: &Fault, context: &RequestContext) -> ErrorResponse {
        self.translator().translate(fault, context)
    }

    /// Write the response entity onto the wire
    fn deliver(&self, response: &ErrorResponse) -> Response;
}

/// A fault travelling out of a handler in response extensions
#[derive(Debug, Clone)]
pub(crate) struct RaisedFault {
    pub style: Style,
    pub fault: Arc<Fault>,
}

/// Placeholder response carrying `fault` to the adapter layer
///
/// The status is already the classified one, so a router without the
/// matching adapter still answers with the right code.
pub(crate) fn raised_response(style: Style, fault: Fault) -> Response {
    let status = classify(&fault).status;
    let mut response = status.into_response();
    response.extensions_mut().insert(RaisedFault {
        style,
        fault: Arc::new(fault),
    });
    response
}

/// JSON body with the status taken from `statusCode`
pub fn json_response(response: &ErrorResponse) -> Response {
    (response.status(), Json(response)).into_response()
}

/// Middleware translating faults raised in the adapter's style
pub(crate) async fn translate_raised<A: TransportAdapter>(
    State(adapter): State<Arc<A>>,
    request: Request,
    next: Next,
) -> Response {
    let context = context_of(&request);
    let mut response = next.run(request).await;

    let ours = response
        .extensions()
        .get::<RaisedFault>()
        .is_some_and(|raised| raised.style == A::STYLE);
    if !ours {
        return response;
    }

    let Some(raised) = response.extensions_mut().remove::<RaisedFault>() else {
        return response;
    };

    tracing::debug!(style = %A::STYLE, category = %raised.fault.category(), "translating raised fault");

    adapter.deliver(&adapter.translate(&raised.fault, &context))
}
