//! Request tracing.

use std::future::Future;
use std::time::Instant;

use tracing::{Instrument, Span, info, warn};

use crate::response::Response;

/// Runs `fut` inside `span` and logs its outcome once the response head is
/// ready. Streamed bodies keep flowing after this returns; their failures are
/// logged by the producer.
pub async fn instrument<F>(span: Span, fut: F) -> Response
where
    F: Future<Output = Response>,
{
    let started = Instant::now();
    let res = fut.instrument(span.clone()).await;
    let status = res.status_code().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| {
        if res.status_code().is_server_error() {
            warn!(status, latency_ms, "request failed");
        } else {
            info!(status, latency_ms, "request completed");
        }
    });
    res
}
