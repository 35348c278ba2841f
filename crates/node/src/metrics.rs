//! Monitoring and Metrics Collection
//!
//! Prometheus metrics for node readiness and sync monitoring.

use prometheus::{
    Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    // Sync monitor metrics
    pub static ref SYNC_POLLS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("wnode_sync_polls_total", "Total number of sync engine checks"),
        &["phase"]  // start | completion
    ).unwrap();

    pub static ref SYNC_OUTCOMES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("wnode_sync_outcomes_total", "Total number of finished poll calls"),
        &["outcome"]  // completed | start_timeout | completion_timeout
    ).unwrap();

    pub static ref SYNC_POLL_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("wnode_sync_poll_duration_seconds", "Wall time of a poll call in seconds")
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 30.0, 120.0, 600.0])
    ).unwrap();

    // Lifecycle metrics
    pub static ref NODE_READY: Gauge = Gauge::new(
        "wnode_node_ready",
        "1 once node bring-up has completed"
    ).unwrap();

    pub static ref NODE_BRINGUP_FAILURES: Counter = Counter::new(
        "wnode_node_bringup_failures_total",
        "Total number of failed node bring-ups"
    ).unwrap();
}

/// Metrics collector
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        let registry = Registry::new();

        registry.register(Box::new(SYNC_POLLS_TOTAL.clone())).unwrap();
        registry.register(Box::new(SYNC_OUTCOMES_TOTAL.clone())).unwrap();
        registry.register(Box::new(SYNC_POLL_DURATION.clone())).unwrap();
        registry.register(Box::new(NODE_READY.clone())).unwrap();
        registry.register(Box::new(NODE_BRINGUP_FAILURES.clone())).unwrap();

        Self {
            registry: Arc::new(registry),
        }
    }

    /// Gather metrics as Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn record_sync_check(phase: &str) {
    SYNC_POLLS_TOTAL.with_label_values(&[phase]).inc();
}

pub(crate) fn record_sync_outcome(outcome: &str, elapsed_secs: f64) {
    SYNC_OUTCOMES_TOTAL.with_label_values(&[outcome]).inc();
    SYNC_POLL_DURATION.observe(elapsed_secs);
}
