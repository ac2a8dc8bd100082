//! Process group host.
//!
//! # Responsibilities
//! - Read the agent definitions for one process group from the config DB
//! - Own the agent and recorder tasks for that group
//! - Stop them together and report any task that failed

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;
use crate::unit::agent::{Agent, AgentDefinition, AgentStats};
use crate::unit::recorder::Recorder;
use crate::unit::{ManagedUnit, UnitError, UnitFactory};

/// Interval between statistics snapshots.
pub const DEFAULT_RECORD_INTERVAL: Duration = Duration::from_secs(10);

/// Contents of the persisted configuration store.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigDb {
    #[serde(default)]
    pub agents: Vec<AgentDefinition>,
}

impl ConfigDb {
    pub fn load(path: &Path) -> Result<Self, UnitError> {
        let content = fs::read_to_string(path).map_err(|source| UnitError::ConfigDb {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| UnitError::InvalidConfigDb {
            path: path.display().to_string(),
            source,
        })
    }

    /// Agents belonging to `process_group`, in file order.
    pub fn agents_for(&self, process_group: i64) -> Vec<AgentDefinition> {
        self.agents
            .iter()
            .filter(|a| a.process_group == process_group)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    Idle,
    Running,
    Stopped,
}

/// Managed unit backed by tokio tasks.
pub struct ProcessGroupHost {
    process_group: i64,
    agents: Vec<AgentDefinition>,
    stats: Vec<(String, Arc<AgentStats>)>,
    record_interval: Duration,
    recording: bool,
    shutdown: Shutdown,
    tasks: Vec<(String, JoinHandle<Result<(), UnitError>>)>,
    state: HostState,
}

impl ProcessGroupHost {
    /// Build a host from the config DB at `config_db_path`.
    pub fn new(config_db_path: &Path, process_group: i64) -> Result<Self, UnitError> {
        let db = ConfigDb::load(config_db_path)?;
        let agents = db.agents_for(process_group);

        if agents.is_empty() {
            tracing::warn!(
                process_group,
                config_db = %config_db_path.display(),
                "No agents configured for process group"
            );
        }

        Ok(Self {
            process_group,
            agents,
            stats: Vec::new(),
            record_interval: DEFAULT_RECORD_INTERVAL,
            recording: false,
            shutdown: Shutdown::new(),
            tasks: Vec::new(),
            state: HostState::Idle,
        })
    }

    pub fn with_record_interval(mut self, interval: Duration) -> Self {
        self.record_interval = interval;
        self
    }

    pub fn agents(&self) -> &[AgentDefinition] {
        &self.agents
    }

    /// Cycle count per agent; empty until agents are started.
    pub fn agent_cycles(&self) -> Vec<(String, u64)> {
        self.stats
            .iter()
            .map(|(name, stats)| (name.clone(), stats.cycles()))
            .collect()
    }

    fn invalid(&self, reason: &'static str) -> UnitError {
        UnitError::InvalidState {
            process_group: self.process_group,
            reason,
        }
    }
}

#[async_trait]
impl ManagedUnit for ProcessGroupHost {
    fn process_group(&self) -> i64 {
        self.process_group
    }

    async fn start_agents(&mut self) -> Result<(), UnitError> {
        if self.state != HostState::Idle {
            return Err(self.invalid("agents already started"));
        }

        for definition in &self.agents {
            let stats = Arc::new(AgentStats::default());
            self.stats.push((definition.name.clone(), stats.clone()));

            let agent = Agent::new(definition.clone(), stats);
            let shutdown = self.shutdown.subscribe();
            let handle = tokio::spawn(async move {
                agent.run(shutdown).await;
                Ok(())
            });
            self.tasks.push((definition.name.clone(), handle));
        }

        self.state = HostState::Running;
        tracing::info!(
            process_group = self.process_group,
            agents = self.agents.len(),
            "Agents started"
        );
        Ok(())
    }

    async fn stop_agents(&mut self) -> Result<(), UnitError> {
        match self.state {
            HostState::Idle => {
                self.state = HostState::Stopped;
                tracing::debug!(process_group = self.process_group, "Host stopped before start");
                return Ok(());
            }
            HostState::Stopped => return Err(self.invalid("agents already stopped")),
            HostState::Running => {}
        }

        self.shutdown.trigger();
        self.state = HostState::Stopped;

        let mut first_error = None;
        for (task, handle) in self.tasks.drain(..) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(UnitError::Task {
                    process_group: self.process_group,
                    task: task.clone(),
                    reason: e.to_string(),
                }),
            };

            if let Err(e) = result {
                tracing::error!(process_group = self.process_group, task = %task, error = %e, "Task failed during stop");
                first_error.get_or_insert(e);
            }
        }

        tracing::info!(process_group = self.process_group, "Agents stopped");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn start_data_recording(&mut self, path: &Path) -> Result<(), UnitError> {
        if self.state != HostState::Running || self.shutdown.is_triggered() {
            return Err(self.invalid("agents are not running"));
        }
        if self.recording {
            return Err(self.invalid("data recording already started"));
        }

        let recorder = Recorder::open(
            path,
            self.process_group,
            self.record_interval,
            self.stats.clone(),
        )?;
        let shutdown = self.shutdown.subscribe();
        self.tasks
            .push(("recorder".to_string(), tokio::spawn(recorder.run(shutdown))));
        self.recording = true;
        Ok(())
    }
}

/// Factory producing [`ProcessGroupHost`] units.
#[derive(Debug, Clone)]
pub struct HostFactory {
    record_interval: Duration,
}

impl HostFactory {
    pub fn new() -> Self {
        Self {
            record_interval: DEFAULT_RECORD_INTERVAL,
        }
    }

    pub fn with_record_interval(mut self, interval: Duration) -> Self {
        self.record_interval = interval;
        self
    }
}

impl Default for HostFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitFactory for HostFactory {
    fn build(
        &self,
        config_db_path: &Path,
        process_group: i64,
    ) -> Result<Box<dyn ManagedUnit>, UnitError> {
        let host = ProcessGroupHost::new(config_db_path, process_group)?
            .with_record_interval(self.record_interval);
        Ok(Box::new(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use crate::unit::recorder::StatisticsRecord;

    const DB: &str = r#"{
        "agents": [
            { "name": "poller", "process_group": 1, "cycle_ms": 5 },
            { "name": "writer", "process_group": 1, "cycle_ms": 5 },
            { "name": "other", "process_group": 2 }
        ]
    }"#;

    fn write_db(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("config_db.json");
        fs::write(&path, DB).unwrap();
        path
    }

    #[test]
    fn selects_agents_for_process_group() {
        let dir = tempfile::tempdir().unwrap();
        let host = ProcessGroupHost::new(&write_db(&dir), 1).unwrap();

        let names: Vec<_> = host.agents().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["poller", "writer"]);
        assert_eq!(host.process_group(), 1);
    }

    #[test]
    fn missing_config_db_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProcessGroupHost::new(&dir.path().join("absent.json"), 1).err();
        assert!(matches!(err, Some(UnitError::ConfigDb { .. })));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ nope").unwrap();
        let err = ProcessGroupHost::new(&bad, 1).err();
        assert!(matches!(err, Some(UnitError::InvalidConfigDb { .. })));
    }

    #[tokio::test]
    async fn start_record_stop() {
        let dir = tempfile::tempdir().unwrap();
        let stats_path = dir.path().join("stats.jsonl");
        let mut host = ProcessGroupHost::new(&write_db(&dir), 1)
            .unwrap()
            .with_record_interval(Duration::from_millis(10));

        host.start_agents().await.unwrap();
        host.start_data_recording(&stats_path).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        host.stop_agents().await.unwrap();

        assert!(host.agent_cycles().iter().all(|(_, cycles)| *cycles >= 1));

        let content = fs::read_to_string(&stats_path).unwrap();
        let last: StatisticsRecord =
            serde_json::from_str(content.lines().last().unwrap()).unwrap();
        assert_eq!(last.process_group, 1);
        assert_eq!(last.agents.len(), 2);
    }

    #[tokio::test]
    async fn rejects_invalid_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ProcessGroupHost::new(&write_db(&dir), 2).unwrap();

        let err = host.start_data_recording(&dir.path().join("s.jsonl")).await;
        assert!(matches!(err, Err(UnitError::InvalidState { .. })));

        host.start_agents().await.unwrap();
        assert!(host.start_agents().await.is_err());

        host.stop_agents().await.unwrap();
        assert!(host.stop_agents().await.is_err());
    }

    #[tokio::test]
    async fn stop_before_start_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ProcessGroupHost::new(&write_db(&dir), 1).unwrap();
        host.stop_agents().await.unwrap();
        assert!(host.agent_cycles().is_empty());
    }

    #[test]
    fn factory_builds_boxed_units() {
        let dir = tempfile::tempdir().unwrap();
        let unit = HostFactory::new().build(&write_db(&dir), 2).unwrap();
        assert_eq!(unit.process_group(), 2);
    }
}
