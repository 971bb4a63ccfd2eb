//! Job execution span helpers.
//!
//! Provides span creation and status-transition recording for jobs flowing
//! through the worker.

use tracing::Span;

/// Start a span for processing one queue entry.
///
/// The `job.id` field is declared empty and recorded once the entry's
/// payload has been parsed; `job.status` is updated via
/// [`record_status_transition`].
pub fn start_job_span(consumer: &str, msg_id: i64) -> Span {
    tracing::info_span!(
        "job.process",
        "queue.consumer" = consumer,
        "queue.msg_id" = msg_id,
        "job.id" = tracing::field::Empty,
        "job.status" = tracing::field::Empty,
    )
}

/// Record a status transition event on the given span.
///
/// Emits a tracing `info` event scoped to the span.
pub fn record_status_transition(span: &Span, from: &str, to: &str) {
    span.record("job.status", to);
    span.in_scope(|| {
        tracing::info!(from = from, to = to, "status_transition");
    });
}
