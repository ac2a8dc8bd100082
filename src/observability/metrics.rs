//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define orchestrator metrics (units, starts, stops, agent cycles)
//! - Expose Prometheus-compatible metrics endpoint when configured
//!
//! # Metrics
//! - `orchestrator_units` (gauge): units constructed
//! - `orchestrator_lifecycle_state` (gauge): 0=initializing … 3=stopped
//! - `orchestrator_unit_starts_total` (counter): by process_group, outcome
//! - `orchestrator_unit_stops_total` (counter): by process_group, outcome
//! - `agent_cycles_total` (counter): by process_group, agent
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::lifecycle::LifecycleState;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| e.to_string())?;

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

pub fn record_units(count: usize) {
    ::metrics::gauge!("orchestrator_units").set(count as f64);
}

pub fn record_lifecycle_state(state: LifecycleState) {
    let value = match state {
        LifecycleState::Initializing => 0.0,
        LifecycleState::Running => 1.0,
        LifecycleState::Stopping => 2.0,
        LifecycleState::Stopped => 3.0,
    };
    ::metrics::gauge!("orchestrator_lifecycle_state").set(value);
}

pub fn record_unit_start(process_group: i64, ok: bool) {
    ::metrics::counter!(
        "orchestrator_unit_starts_total",
        "process_group" => process_group.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_unit_stop(process_group: i64, ok: bool) {
    ::metrics::counter!(
        "orchestrator_unit_stops_total",
        "process_group" => process_group.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_agent_cycle(process_group: i64, agent: &str) {
    ::metrics::counter!(
        "agent_cycles_total",
        "process_group" => process_group.to_string(),
        "agent" => agent.to_string()
    )
    .increment(1);
}
