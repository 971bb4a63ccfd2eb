//! Metric instrument factories for siteaudit.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! All instruments are created lazily from the `"siteaudit"` meter.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Returns the shared meter for siteaudit instruments.
fn meter() -> Meter {
    opentelemetry::global::meter("siteaudit")
}

/// Counter: intake outcomes.
/// Labels: `result` ("ok" | "rejected").
pub fn jobs_submitted() -> Counter<u64> {
    meter()
        .u64_counter("siteaudit.jobs.submitted")
        .with_description("Audit job submissions by outcome")
        .build()
}

/// Counter: job status transitions.
/// Labels: `to`.
pub fn job_state_transitions() -> Counter<u64> {
    meter()
        .u64_counter("siteaudit.jobs.state_transitions")
        .with_description("Number of job status transitions")
        .build()
}

/// Counter: queue-level operations (create, send, read, archive, set_vt).
/// Labels: `queue`, `operation`.
pub fn queue_operations() -> Counter<u64> {
    meter()
        .u64_counter("siteaudit.queue.operations")
        .with_description("Number of queue operations")
        .build()
}

/// Histogram: audit duration in milliseconds.
/// Labels: `outcome`.
pub fn audit_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("siteaudit.audit.duration_ms")
        .with_description("Audit duration in milliseconds")
        .with_unit("ms")
        .build()
}

/// Counter: cache reads on the status path.
/// Labels: `result` ("hit" | "miss").
pub fn cache_reads() -> Counter<u64> {
    meter()
        .u64_counter("siteaudit.cache.reads")
        .with_description("Status cache reads")
        .build()
}

/// Counter: completion notifications attempted.
/// Labels: `result` ("ok" | "error").
pub fn notifications_sent() -> Counter<u64> {
    meter()
        .u64_counter("siteaudit.notifications.sent")
        .with_description("Completion notifications attempted")
        .build()
}
