// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the PTR record pipeline.
//!
//! All metrics carry the namespace prefix `ptrsync_`.
//!
//! # Metrics Categories
//!
//! - **Pipeline Metrics** - Runs by outcome, run duration, records in the last document
//! - **Source Metrics** - CIDR sources and discovery listings that were skipped
//! - **Delivery Metrics** - Deliveries by sink and outcome
//! - **Error Metrics** - Failures by status reason and requeues
//!
//! # Example
//!
//! ```rust,no_run
//! use ptrsync::metrics::record_pipeline_success;
//!
//! record_pipeline_success("configmap", std::time::Duration::from_millis(40), 254);
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics
const METRICS_NAMESPACE: &str = "ptrsync";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry, exposed via the `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Pipeline Metrics
// ============================================================================

/// Total number of pipeline runs by outcome
///
/// Labels:
/// - `outcome`: `success`, `error` or `cancelled`
pub static PIPELINE_RUNS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_pipeline_runs_total"),
        "Total number of pipeline runs by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of pipeline runs in seconds
///
/// Labels:
/// - `outcome`: `success`, `error` or `cancelled`
pub static PIPELINE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_pipeline_duration_seconds"),
        "Duration of pipeline runs in seconds by outcome",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

/// Number of unique records in the last delivered document
///
/// Labels:
/// - `sink`: `configmap` or `remote`
pub static RECORDS_DELIVERED: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_records_delivered"),
        "Number of unique PTR records in the last delivered document",
    );
    let gauge = GaugeVec::new(opts, &["sink"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Source Metrics
// ============================================================================

/// Total number of CIDR sources skipped
///
/// Labels:
/// - `kind`: `cidr` (configured block), `discovered` (discovered block) or
///   `discovery` (the listing itself failed)
pub static SKIPPED_SOURCES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_skipped_sources_total"),
        "Total number of record sources skipped by kind",
    );
    let counter = CounterVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Delivery Metrics
// ============================================================================

/// Total number of deliveries by sink and outcome
///
/// Labels:
/// - `sink`: `configmap` or `remote`
/// - `outcome`: `created`, `updated`, `unchanged`, `pushed` or `failed`
pub static DELIVERIES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_deliveries_total"),
        "Total number of deliveries by sink and outcome",
    );
    let counter = CounterVec::new(opts, &["sink", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of pipeline errors by status reason
///
/// Labels:
/// - `reason`: status reason (e.g., `InvalidInventory`, `ConnectError`)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of pipeline errors by status reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of requeues scheduled after a failed reconciliation
///
/// Labels:
/// - `reason`: status reason of the failure
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_requeues_total"),
        "Total number of requeue operations by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful pipeline run
///
/// # Arguments
/// * `sink` - Name of the sink the document was delivered to
/// * `duration` - Duration of the run
/// * `records` - Unique records in the delivered document
pub fn record_pipeline_success(sink: &str, duration: Duration, records: usize) {
    PIPELINE_RUNS_TOTAL.with_label_values(&["success"]).inc();
    PIPELINE_DURATION_SECONDS
        .with_label_values(&["success"])
        .observe(duration.as_secs_f64());
    #[allow(clippy::cast_precision_loss)]
    let records = records as f64;
    RECORDS_DELIVERED.with_label_values(&[sink]).set(records);
}

/// Record a failed pipeline run
///
/// # Arguments
/// * `reason` - Status reason of the failure
/// * `duration` - Duration of the run before failure
pub fn record_pipeline_error(reason: &str, duration: Duration) {
    PIPELINE_RUNS_TOTAL.with_label_values(&["error"]).inc();
    PIPELINE_DURATION_SECONDS
        .with_label_values(&["error"])
        .observe(duration.as_secs_f64());
    ERRORS_TOTAL.with_label_values(&[reason]).inc();
}

/// Record a cancelled pipeline run
pub fn record_pipeline_cancelled(duration: Duration) {
    PIPELINE_RUNS_TOTAL.with_label_values(&["cancelled"]).inc();
    PIPELINE_DURATION_SECONDS
        .with_label_values(&["cancelled"])
        .observe(duration.as_secs_f64());
}

/// Record a skipped record source
///
/// # Arguments
/// * `kind` - `cidr`, `discovered` or `discovery`
pub fn record_skipped_source(kind: &str) {
    SKIPPED_SOURCES_TOTAL.with_label_values(&[kind]).inc();
}

/// Record a delivery attempt
///
/// # Arguments
/// * `sink` - Name of the sink
/// * `outcome` - Delivery outcome, or `failed`
pub fn record_delivery(sink: &str, outcome: &str) {
    DELIVERIES_TOTAL.with_label_values(&[sink, outcome]).inc();
}

/// Record a requeue after a failed reconciliation
pub fn record_requeue(reason: &str) {
    REQUEUE_TOTAL.with_label_values(&[reason]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
