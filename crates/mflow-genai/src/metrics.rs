//! Generation client metrics.

use metrics::{counter, histogram};

pub mod names {
    /// Requests to the generative API by operation and status.
    pub const REQUESTS_TOTAL: &str = "mflow_genai_requests_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "mflow_genai_latency_seconds";

    /// Operation status checks issued while waiting for synthesis.
    pub const POLL_ATTEMPTS_TOTAL: &str = "mflow_genai_poll_attempts_total";
}

/// Record a completed request. `status` is 0 when no response arrived.
pub fn record_request(operation: &'static str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation,
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(names::LATENCY_SECONDS, "operation" => operation).record(latency_ms / 1000.0);
}

pub fn record_poll() {
    counter!(names::POLL_ATTEMPTS_TOTAL).increment(1);
}
