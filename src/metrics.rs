use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::weights::WeightMethod;

pub const EVALUATIONS_TOTAL: &str = "evaluations_total";
pub const EVALUATION_FAILURES_TOTAL: &str = "evaluation_failures_total";
pub const EVALUATION_DURATION_MS: &str = "evaluation_duration_ms";
pub const CRITERIA_COUNT: &str = "criteria_count";

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder and publish the criteria gauge.
    /// Fails if a recorder is already installed.
    pub fn init(criteria: usize) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        gauge!(CRITERIA_COUNT).set(criteria as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

// Without an installed recorder these are no-ops.

pub fn record_evaluation(method: WeightMethod) {
    counter!(EVALUATIONS_TOTAL, "method" => method.as_str()).increment(1);
}

pub fn record_failure(kind: &'static str) {
    counter!(EVALUATION_FAILURES_TOTAL, "kind" => kind).increment(1);
}

pub fn record_duration_ms(ms: f64) {
    histogram!(EVALUATION_DURATION_MS).record(ms);
}
