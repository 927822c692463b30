/// Metrics and telemetry for the Nexus Portal backend
///
/// Prometheus-compatible counters for the request surface and the
/// certificate issuance workflow, served at /metrics.

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Total HTTP requests by method, path, and status
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    /// Certificates minted
    pub static ref CERTIFICATES_ISSUED_TOTAL: IntCounter = register_int_counter!(
        "certificates_issued_total",
        "Total number of certificates issued"
    )
    .unwrap();

    /// Internship completions (including idempotent retries)
    pub static ref INTERNSHIP_COMPLETIONS_TOTAL: IntCounter = register_int_counter!(
        "internship_completions_total",
        "Total number of internship completion requests handled"
    )
    .unwrap();

    /// Artifact upload failures (certificate left in artifact-pending state)
    pub static ref ARTIFACT_UPLOADS_FAILED_TOTAL: IntCounter = register_int_counter!(
        "artifact_uploads_failed_total",
        "Total number of failed certificate artifact uploads"
    )
    .unwrap();

    /// Successful artifact uploads
    pub static ref ARTIFACT_UPLOADS_TOTAL: IntCounter = register_int_counter!(
        "artifact_uploads_total",
        "Total number of successful certificate artifact uploads"
    )
    .unwrap();
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
