use std::sync::Arc;

use axum::Json;
use axum::response::{IntoResponse, Response};
use faultline_core::{ErrorResponse, Fault, Translator};
use futures_util::{Stream, TryStreamExt};
use serde::Serialize;

use crate::adapter::{Style, TransportAdapter, json_response, raised_response};

/// Response signalling a fault from a reactive-style handler
#[derive(Debug)]
pub struct FaultResponse(pub Fault);

impl FaultResponse {
    pub fn new(fault: impl Into<Fault>) -> Self {
        Self(fault.into())
    }
}

impl IntoResponse for FaultResponse {
    fn into_response(self) -> Response {
        raised_response(Style::Reactive, self.0)
    }
}

/// Drain a stream of results into a JSON array response
///
/// The first fault the stream yields ends it and becomes the response.
pub async fn collect_json<S, T>(stream: S) -> Response
where
    S: Stream<Item = Result<T, Fault>> + Send,
    T: Serialize + Send,
{
    match stream.try_collect::<Vec<T>>().await {
        Ok(items) => Json(items).into_response(),
        Err(fault) => FaultResponse(fault).into_response(),
    }
}

/// Adapter for handlers answering with [`FaultResponse`]
#[derive(Debug, Clone)]
pub struct ReactiveAdapter {
    translator: Arc<Translator>,
}

impl ReactiveAdapter {
    pub const fn new(translator: Arc<Translator>) -> Self {
        Self { translator }
    }
}

impl TransportAdapter for ReactiveAdapter {
    const STYLE: Style = Style::Reactive;

    fn translator(&self) -> &Translator {
        &self.translator
    }

    fn deliver(&self, response: &ErrorResponse) -> Response {
        json_response(response)
    }
}
