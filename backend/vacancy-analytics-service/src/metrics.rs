//! Prometheus metrics for analytics build runs
//!
//! Tracks run outcomes, run duration and per-query reconciliation results

use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

lazy_static::lazy_static! {
    /// Build runs by outcome (success/failure)
    static ref BUILD_RUNS: IntCounterVec = register_int_counter_vec!(
        "vacancy_analytics_build_runs_total",
        "Analytics build runs by outcome",
        &["outcome"]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Wall time of a full build run
    static ref BUILD_DURATION: Histogram = register_histogram!(
        "vacancy_analytics_build_duration_seconds",
        "Duration of analytics build runs",
        vec![0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]
    ).expect("Prometheus metrics registration should succeed at startup");

    /// Per-query reconciliation results (inserted/updated/failed)
    static ref RECONCILED_QUERIES: IntCounterVec = register_int_counter_vec!(
        "vacancy_analytics_reconciled_queries_total",
        "Per-query analytics reconciliation results",
        &["result"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

pub fn record_run(success: bool, duration_secs: f64) {
    let outcome = if success { "success" } else { "failure" };
    BUILD_RUNS.with_label_values(&[outcome]).inc();
    BUILD_DURATION.observe(duration_secs);
}

pub fn record_reconciliation(result: &str) {
    RECONCILED_QUERIES.with_label_values(&[result]).inc();
}

/// Text exposition of the default registry.
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_metrics_are_exported() {
        record_run(true, 0.25);
        record_reconciliation("inserted");

        let text = gather_text();
        assert!(text.contains("vacancy_analytics_build_runs_total"));
        assert!(text.contains("vacancy_analytics_reconciled_queries_total"));
    }
}
