//! axum transport adapters for fault translation
//!
//! Three handling styles share one [`Translator`]:
//! - blocking: handlers return [`HandlerResult`]
//! - reactive: handlers answer with [`FaultResponse`], directly or from a stream
//! - annotated: [`ValidJson`] and [`ValidQuery`] reject with validation faults
//!
//! [`ErrorHandling::apply`] installs the adapters enabled in configuration.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod adapter;
mod annotated;
mod blocking;
mod reactive;
mod request_context;

use std::sync::Arc;

use axum::Router;
use faultline_config::{Config, HandlersConfig};
use faultline_core::{LogSink, StackTraceDigester, Translator, TracingSink};

pub use adapter::{Style, TransportAdapter, json_response};
pub use annotated::{AnnotatedAdapter, Rejection, ValidJson, ValidQuery, decode_json};
pub use blocking::{BlockingAdapter, HandlerError, HandlerResult};
pub use reactive::{FaultResponse, ReactiveAdapter, collect_json};
pub use request_context::request_context_middleware;

/// Fault translation assembled from configuration
#[derive(Debug, Clone)]
pub struct ErrorHandling {
    translator: Arc<Translator>,
    handlers: HandlersConfig,
}

impl ErrorHandling {
    /// Build from configuration, logging through `tracing`
    pub fn from_config(config: &Config) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Build from configuration with an explicit log sink
    pub fn with_sink(config: &Config, sink: Arc<dyn LogSink>) -> Self {
        let digester = StackTraceDigester::with_limits(
            config.digest.own_code_prefix.clone(),
            config.digest.kept_frames,
            config.digest.search_window,
        );

        Self::with_translator(Arc::new(Translator::new(digester, sink)), config.handlers)
    }

    pub const fn with_translator(translator: Arc<Translator>, handlers: HandlersConfig) -> Self {
        Self { translator, handlers }
    }

    /// Install the enabled adapters on `router`
    ///
    /// Call after all routes are added. The blocking style also answers
    /// unmatched routes and methods, replacing any fallback set before.
    pub fn apply<S>(&self, mut router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        if self.handlers.enable_blocking_style {
            router = router
                .fallback(blocking::no_route)
                .method_not_allowed_fallback(blocking::method_not_allowed)
                .layer(axum::middleware::from_fn_with_state(
                    Arc::new(BlockingAdapter::new(self.translator.clone())),
                    adapter::translate_raised::<BlockingAdapter>,
                ));
        }

        if self.handlers.enable_reactive_style {
            router = router.layer(axum::middleware::from_fn_with_state(
                Arc::new(ReactiveAdapter::new(self.translator.clone())),
                adapter::translate_raised::<ReactiveAdapter>,
            ));
        }

        if self.handlers.enable_annotated_style {
            router = router.layer(axum::middleware::from_fn_with_state(
                Arc::new(AnnotatedAdapter::new(self.translator.clone())),
                adapter::translate_raised::<AnnotatedAdapter>,
            ));
        }

        tracing::debug!(
            blocking = self.handlers.enable_blocking_style,
            reactive = self.handlers.enable_reactive_style,
            annotated = self.handlers.enable_annotated_style,
            "fault translation adapters installed"
        );

        // Outermost, so every adapter sees the request as it arrived
        router.layer(axum::middleware::from_fn(request_context_middleware))
    }
}
