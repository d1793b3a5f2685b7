use std::sync::OnceLock;
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_http_response(status: u16, latency: Duration) {
    let status = status.to_string();
    metrics::counter!("http_requests_total", "status" => status.clone()).increment(1);
    metrics::histogram!("http_request_duration_seconds", "status" => status)
        .record(latency.as_secs_f64());
}

pub(crate) fn record_registration_started() {
    metrics::counter!("registrations_started_total").increment(1);
}

pub(crate) fn record_test_result(score: f64) {
    metrics::counter!("test_results_created_total").increment(1);
    metrics::histogram!("test_result_score").record(score);
}

pub(crate) fn record_purged(kind: &'static str, count: u64) {
    metrics::counter!("maintenance_purged_total", "kind" => kind).increment(count);
}
