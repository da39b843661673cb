//! Metrics collection and exposition.
//!
//! # Metrics
//! - `activity_in_flight` (gauge): calls issued but not settled
//! - `activity_calls_total` (counter): settled calls by outcome
//! - `activity_call_duration_seconds` (histogram): issue-to-settle latency
//! - `activity_phase_transitions_total` (counter): phase entries by phase

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::progress::Phase;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_in_flight(in_flight: usize) {
    gauge!("activity_in_flight").set(in_flight as f64);
}

pub fn record_call(outcome: &'static str, started: Instant) {
    counter!("activity_calls_total", "outcome" => outcome).increment(1);
    histogram!("activity_call_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_phase(phase: Phase) {
    counter!("activity_phase_transitions_total", "phase" => phase.as_str()).increment(1);
}
