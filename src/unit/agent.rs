//! Background agents.
//!
//! # Responsibilities
//! - Run one periodic work cycle per configured agent
//! - Count completed cycles for the recorder
//! - Exit promptly on the unit's shutdown broadcast

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time;

use crate::observability::metrics;

/// Agent entry in the config DB.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentDefinition {
    /// Agent name, unique within its process group.
    pub name: String,

    /// Process group the agent belongs to.
    pub process_group: i64,

    /// Cycle interval in milliseconds.
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u64,
}

fn default_cycle_ms() -> u64 {
    1000
}

/// Counters shared between an agent and the recorder.
#[derive(Debug, Default)]
pub struct AgentStats {
    cycles: AtomicU64,
}

impl AgentStats {
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct Agent {
    definition: AgentDefinition,
    stats: Arc<AgentStats>,
}

impl Agent {
    pub fn new(definition: AgentDefinition, stats: Arc<AgentStats>) -> Self {
        Self { definition, stats }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let name = self.definition.name.as_str();
        let process_group = self.definition.process_group;

        tracing::debug!(
            process_group,
            agent = %name,
            cycle_ms = self.definition.cycle_ms,
            "Agent starting"
        );

        let mut ticker = time::interval(Duration::from_millis(self.definition.cycle_ms.max(1)));
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.stats.record_cycle();
                    metrics::record_agent_cycle(process_group, name);
                    tracing::trace!(process_group, agent = %name, "Agent cycle");
                }
                _ = shutdown.recv() => {
                    tracing::debug!(
                        process_group,
                        agent = %name,
                        cycles = self.stats.cycles(),
                        "Agent received shutdown signal, exiting loop"
                    );
                    break;
                }
            }
        }
    }
}
