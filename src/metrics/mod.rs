// Metrics module for Prometheus observability
// Author: kelexine (https://github.com/kelexine)

mod registry;

pub use registry::{gather_metrics, GEMINI_API_CALLS, GEMINI_API_DURATION, RELAY_REQUESTS};

/// Helper to record the outcome of one chat request
pub fn record_outcome(outcome: &str) {
    RELAY_REQUESTS.with_label_values(&[outcome]).inc();
}

/// Helper to record Gemini API call metrics.
///
/// `status_code` is `None` when the call failed before a response arrived.
pub fn record_gemini_call(model: &str, status_code: Option<u16>, duration_secs: f64) {
    let status = status_code.map_or_else(|| "0".to_string(), |s| s.to_string());

    GEMINI_API_CALLS
        .with_label_values(&[model, &status])
        .inc();

    GEMINI_API_DURATION
        .with_label_values(&[model])
        .observe(duration_secs);
}
