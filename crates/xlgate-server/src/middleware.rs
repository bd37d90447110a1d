//! Middleware for the xlgate server

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;

/// Request tracing layer
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// Cap request bodies slightly above the accepted file size so the
/// validation chain, not the transport, is what reports oversized files.
pub fn body_limit_layer(config: &Config) -> RequestBodyLimitLayer {
    // Slack covers multipart framing and the initiator field.
    const MULTIPART_SLACK_BYTES: u64 = 64 * 1024;
    RequestBodyLimitLayer::new(
        (config.ingest.max_file_size_bytes.saturating_mul(2) + MULTIPART_SLACK_BYTES) as usize,
    )
}
