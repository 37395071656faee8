use http::{HeaderMap, Method, Uri};

/// Header carrying an explicit per-request trace id
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// W3C trace context header
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Request facts a fault is translated against
///
/// Built once per request by the transport layer and passed explicitly to
/// the translator; the trace id is read-only for the life of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    method: Method,
    request_uri: String,
    trace_id: Option<String>,
}

impl RequestContext {
    pub fn new(method: Method, request_uri: impl Into<String>) -> Self {
        Self {
            method,
            request_uri: request_uri.into(),
            trace_id: None,
        }
    }

    /// Attach the ambient trace id
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Build from HTTP request parts
    ///
    /// The request path (without query string) becomes `requestUri`; the
    /// trace id is taken from the headers as described in [`trace_id_from_headers`].
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        Self::from_head(&parts.method, &parts.uri, &parts.headers)
    }

    /// Build from the method, URI and headers of a request
    pub fn from_head(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        Self {
            method: method.clone(),
            request_uri: uri.path().to_owned(),
            trace_id: trace_id_from_headers(headers),
        }
    }

    /// Minimal context for faults raised outside a request
    pub fn empty() -> Self {
        Self::new(Method::GET, "/")
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

/// Find the ambient trace id in request headers
///
/// `x-trace-id` wins; otherwise the trace-id field of a well-formed
/// `traceparent` (`version-traceid-spanid-flags`) is used. Blank values
/// and the all-zero trace id are ignored.
pub fn trace_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let explicit = headers
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(trace_id) = explicit {
        return Some(trace_id.to_owned());
    }

    let traceparent = headers.get(TRACEPARENT_HEADER)?.to_str().ok()?;
    let mut fields = traceparent.trim().split('-');
    let (_version, trace_id) = (fields.next()?, fields.next()?);

    let well_formed = trace_id.len() == 32
        && trace_id.bytes().all(|b| b.is_ascii_hexdigit())
        && trace_id.bytes().any(|b| b != b'0');

    well_formed.then(|| trace_id.to_ascii_lowercase())
}
