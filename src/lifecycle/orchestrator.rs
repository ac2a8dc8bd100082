//! Orchestrator control flow.
//!
//! # States
//! ```text
//! Initializing → Running → Stopping → Stopped
//! ```
//!
//! Construction order, start order, and stop order are the same and never
//! change after [`Orchestrator::build`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Settings;
use crate::error::OrchestratorError;
use crate::lifecycle::signals::TerminationSignal;
use crate::observability::metrics;
use crate::unit::{ManagedUnit, UnitError, UnitFactory};

/// How often the wait loop checks the termination flag.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Initializing,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Initializing => "initializing",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

struct UnitSlot {
    unit: Box<dyn ManagedUnit>,
    process_group: i64,
    start_attempted: bool,
    stopped: bool,
}

/// Outcome of the stop phase.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Process groups stopped cleanly, in stop order.
    pub stopped: Vec<i64>,
    /// Process groups whose stop call failed.
    pub failures: Vec<(i64, UnitError)>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_result(self) -> Result<(), OrchestratorError> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(OrchestratorError::UnitStop(self.failures))
        }
    }
}

/// Owns the managed units and drives them through their lifecycle.
pub struct Orchestrator {
    settings: Settings,
    signal: Arc<TerminationSignal>,
    units: Vec<UnitSlot>,
    state: LifecycleState,
    poll_interval: Duration,
}

impl Orchestrator {
    /// Build one unit per configured process group, in configuration order.
    ///
    /// Any construction failure aborts the whole build; nothing is started.
    pub fn build(
        settings: Settings,
        signal: Arc<TerminationSignal>,
        factory: &dyn UnitFactory,
    ) -> Result<Self, OrchestratorError> {
        let mut units = Vec::with_capacity(settings.process_groups.len());

        for &process_group in &settings.process_groups {
            if units.iter().any(|slot: &UnitSlot| slot.process_group == process_group) {
                tracing::warn!(process_group, "Process group listed more than once");
            }
            let unit = factory
                .build(&settings.config_db_path, process_group)
                .map_err(|source| OrchestratorError::UnitBuild {
                    process_group,
                    source,
                })?;
            tracing::debug!(process_group, "Unit constructed");
            units.push(UnitSlot {
                unit,
                process_group,
                start_attempted: false,
                stopped: false,
            });
        }

        metrics::record_units(units.len());
        metrics::record_lifecycle_state(LifecycleState::Initializing);

        Ok(Self {
            settings,
            signal,
            units,
            state: LifecycleState::Initializing,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Process groups in construction order.
    pub fn process_groups(&self) -> Vec<i64> {
        self.units.iter().map(|slot| slot.process_group).collect()
    }

    fn transition(&mut self, next: LifecycleState) {
        tracing::info!(from = %self.state, to = %next, "Lifecycle transition");
        self.state = next;
        metrics::record_lifecycle_state(next);
    }

    /// Start every unit in construction order.
    ///
    /// Stops at the first failure; units after it are never started.
    pub async fn start(&mut self) -> Result<(), OrchestratorError> {
        if self.state != LifecycleState::Initializing {
            tracing::warn!(state = %self.state, "Start requested outside initialization, ignoring");
            return Ok(());
        }
        self.transition(LifecycleState::Running);

        let statistics = self.settings.statistics_db_path.as_deref();

        for slot in &mut self.units {
            let process_group = slot.process_group;
            slot.start_attempted = true;

            let mut result = slot.unit.start_agents().await;
            if result.is_ok() {
                if let Some(path) = statistics {
                    result = slot.unit.start_data_recording(path).await;
                }
            }

            metrics::record_unit_start(process_group, result.is_ok());
            if let Err(source) = result {
                tracing::error!(process_group, error = %source, "Unit failed to start");
                return Err(OrchestratorError::UnitStart {
                    process_group,
                    source,
                });
            }

            tracing::info!(
                process_group,
                recording = statistics.is_some(),
                "Unit started"
            );
        }

        Ok(())
    }

    /// Block until the termination signal is observed.
    pub async fn wait_for_termination(&self) {
        if self.state != LifecycleState::Running {
            return;
        }
        tracing::info!(
            units = self.units.len(),
            poll_ms = self.poll_interval.as_millis() as u64,
            "Waiting for termination signal"
        );
        self.signal.wait(self.poll_interval).await;
    }

    /// Stop every unit whose start was attempted, in construction order.
    ///
    /// Each unit receives at most one stop call over the orchestrator's
    /// lifetime. A failing unit does not prevent later units from stopping.
    pub async fn stop(&mut self) -> ShutdownReport {
        let mut report = ShutdownReport::default();
        if self.state == LifecycleState::Stopped {
            return report;
        }
        self.transition(LifecycleState::Stopping);

        for slot in &mut self.units {
            if !slot.start_attempted || slot.stopped {
                continue;
            }
            slot.stopped = true;

            let process_group = slot.process_group;
            match slot.unit.stop_agents().await {
                Ok(()) => {
                    tracing::info!(process_group, "Unit stopped");
                    metrics::record_unit_stop(process_group, true);
                    report.stopped.push(process_group);
                }
                Err(e) => {
                    tracing::error!(process_group, error = %e, "Unit failed to stop");
                    metrics::record_unit_stop(process_group, false);
                    report.failures.push((process_group, e));
                }
            }
        }

        self.transition(LifecycleState::Stopped);
        report
    }

    /// Start, wait for termination, stop.
    ///
    /// When startup fails the wait is skipped, the units whose start was
    /// attempted are still stopped, and the startup error is returned.
    pub async fn run(mut self) -> Result<(), OrchestratorError> {
        let started = self.start().await;

        if started.is_ok() {
            self.wait_for_termination().await;
        } else if let Err(e) = &started {
            tracing::error!(error = %e, "Startup aborted, stopping started units");
        }

        let report = self.stop().await;
        started?;
        report.into_result()
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        let pending: Vec<i64> = self
            .units
            .iter()
            .filter(|slot| slot.start_attempted && !slot.stopped)
            .map(|slot| slot.process_group)
            .collect();

        if !pending.is_empty() {
            tracing::warn!(process_groups = ?pending, "Orchestrator dropped with units still running");
        }
    }
}
