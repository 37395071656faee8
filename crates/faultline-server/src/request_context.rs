use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use faultline_core::RequestContext;

/// Middleware that constructs a `RequestContext` from the incoming request
///
/// Runs outside the adapter layers so every translation sees the same
/// method, path and trace id the request arrived with.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let context = context_of(&request);

    if let Some(trace_id) = context.trace_id() {
        tracing::trace!(%trace_id, uri = %context.request_uri(), "request context");
    }

    request.extensions_mut().insert(context);

    next.run(request).await
}

/// Context already attached to `request`, or one built from its head
pub(crate) fn context_of(request: &Request) -> RequestContext {
    request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(|| RequestContext::from_head(request.method(), request.uri(), request.headers()))
}
