/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Metrics Module
//!
//! Prometheus metrics describing the server itself: HTTP traffic, live relay
//! connections, health-check outcomes, external probes and the metrics
//! recording job. Exposed on `/internal/metrics`.
//!
//! These are unrelated to the agent metrics stored in `historical_metrics`.

use once_cell::sync::Lazy;
use prometheus::{
    CounterVec, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Global Prometheus registry for all server metrics
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// HTTP request counter
/// Labels: endpoint, method, status
pub static HTTP_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    let opts = Opts::new(
        "mission_control_http_requests_total",
        "Total number of HTTP requests by endpoint and status",
    );
    let counter = CounterVec::new(opts, &["endpoint", "method", "status"])
        .expect("Failed to create HTTP requests counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register HTTP requests counter");
    counter
});

/// HTTP request duration histogram
/// Labels: endpoint, method
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let opts = HistogramOpts::new(
        "mission_control_http_request_duration_seconds",
        "HTTP request latency distribution in seconds",
    )
    .buckets(vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ]);
    let histogram = HistogramVec::new(opts, &["endpoint", "method"])
        .expect("Failed to create HTTP request duration histogram");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("Failed to register HTTP request duration histogram");
    histogram
});

/// Number of open live-metrics streams
pub static RELAY_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    let opts = Opts::new(
        "mission_control_relay_connections_active",
        "Number of connected live-metrics clients",
    );
    let gauge = IntGauge::with_opts(opts).expect("Failed to create relay connections gauge");
    REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("Failed to register relay connections gauge");
    gauge
});

/// Relay events pushed to clients
/// Labels: type (connected, metrics, error)
pub static RELAY_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new(
        "mission_control_relay_events_total",
        "Total number of live-metrics events sent, by type",
    );
    let counter =
        IntCounterVec::new(opts, &["type"]).expect("Failed to create relay events counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register relay events counter");
    counter
});

/// Health-check classifications written by the trigger
/// Labels: status (healthy, degraded, down)
pub static HEALTH_CHECK_RESULTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new(
        "mission_control_health_check_results_total",
        "Total number of agent health classifications recorded, by status",
    );
    let counter = IntCounterVec::new(opts, &["status"])
        .expect("Failed to create health check results counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register health check results counter");
    counter
});

/// External agent probe outcomes
/// Labels: outcome (online, offline)
pub static PROBE_RESULTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let opts = Opts::new(
        "mission_control_probe_results_total",
        "Total number of external agent probes, by outcome",
    );
    let counter =
        IntCounterVec::new(opts, &["outcome"]).expect("Failed to create probe results counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register probe results counter");
    counter
});

/// Historical metric rows written by the recording job
pub static METRIC_SAMPLES_RECORDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "mission_control_metric_samples_recorded_total",
        "Total number of historical metric samples recorded",
    )
    .expect("Failed to create recorded samples counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register recorded samples counter");
    counter
});

/// Historical metric rows removed by retention
pub static METRIC_SAMPLES_PRUNED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "mission_control_metric_samples_pruned_total",
        "Total number of historical metric samples deleted by retention",
    )
    .expect("Failed to create pruned samples counter");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("Failed to register pruned samples counter");
    counter
});

/// Records one finished HTTP request.
pub fn record_http_request(endpoint: &str, method: &str, status: u16, duration_seconds: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[endpoint, method, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint, method])
        .observe(duration_seconds);
}

/// Encodes all registered metrics in Prometheus text format
pub fn encode_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("Failed to encode metrics: {}", e))?;
    String::from_utf8(buffer).map_err(|e| format!("Metrics were not valid UTF-8: {}", e))
}
