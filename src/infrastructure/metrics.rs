//! Prometheus metrics for the dialer

use crate::domain::campaign::value_object::CallOutcome;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe the dialer metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("autodial_call_duration_seconds".to_string()),
            &[1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0],
        )?
        .install_recorder()?;

    describe_counter!(
        "autodial_calls_total",
        "Total number of call attempts by outcome"
    );
    describe_counter!(
        "autodial_sessions_total",
        "Total number of dial sessions started"
    );
    describe_gauge!(
        "autodial_session_running",
        "1 while a dial session is active"
    );
    describe_histogram!(
        "autodial_call_duration_seconds",
        "Duration of finished call attempts in seconds"
    );

    Ok(handle)
}

/// Record a finished call attempt
pub fn record_call_outcome(outcome: CallOutcome, duration: Duration) {
    counter!("autodial_calls_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("autodial_call_duration_seconds").record(duration.as_secs_f64());
}

/// Record a session start
pub fn record_session_started() {
    counter!("autodial_sessions_total").increment(1);
    gauge!("autodial_session_running").set(1.0);
}

/// Record a session reaching idle
pub fn record_session_finished() {
    gauge!("autodial_session_running").set(0.0);
}
