//! In-process application driven through `tower::ServiceExt::oneshot`

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use faultline_config::Config;
use faultline_core::MemorySink;
use faultline_core::sink::LogEntry;
use faultline_server::ErrorHandling;
use http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use super::routes;

/// The order service with fault translation installed
pub struct TestApp {
    router: Router,
    sink: Arc<MemorySink>,
}

/// A fully read response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Value::Null` when the body is empty
    pub body: Value,
}

impl TestResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    pub fn new(config: Config) -> Self {
        let sink = Arc::new(MemorySink::new());
        let handling = ErrorHandling::with_sink(&config, sink.clone());
        let router = handling.apply(routes::router());

        Self { router, sink }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str, content_type: &str, body: &str) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_owned()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_json(&self, uri: &str, body: &str) -> TestResponse {
        self.post(uri, "application/json", body).await
    }

    /// Entries the log sink received so far
    pub fn log(&self) -> Vec<LogEntry> {
        self.sink.entries()
    }
}
