//! Telemetry recording.
//!
//! Appends one JSON line per interval to the statistics file with the cycle
//! count of every agent in the process group, plus a final line on shutdown.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time;

use crate::unit::agent::AgentStats;
use crate::unit::UnitError;

/// One line of the statistics file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsRecord {
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub process_group: i64,
    /// Cycle count per agent name.
    pub agents: BTreeMap<String, u64>,
}

pub struct Recorder {
    path: PathBuf,
    file: File,
    process_group: i64,
    interval: Duration,
    agents: Vec<(String, Arc<AgentStats>)>,
}

impl Recorder {
    /// Open `path` for appending, creating it if needed.
    pub fn open(
        path: &Path,
        process_group: i64,
        interval: Duration,
        agents: Vec<(String, Arc<AgentStats>)>,
    ) -> Result<Self, UnitError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| UnitError::Recording {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            process_group,
            interval,
            agents,
        })
    }

    pub fn snapshot(&self) -> StatisticsRecord {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        StatisticsRecord {
            timestamp,
            process_group: self.process_group,
            agents: self
                .agents
                .iter()
                .map(|(name, stats)| (name.clone(), stats.cycles()))
                .collect(),
        }
    }

    fn write_snapshot(&mut self) -> Result<(), UnitError> {
        let record = self.snapshot();
        let mut line = serde_json::to_vec(&record).map_err(|e| UnitError::Recording {
            path: self.path.display().to_string(),
            source: e.into(),
        })?;
        line.push(b'\n');

        // Single write per line; units may share one statistics file
        self.file
            .write_all(&line)
            .map_err(|source| UnitError::Recording {
                path: self.path.display().to_string(),
                source,
            })
    }

    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> Result<(), UnitError> {
        tracing::info!(
            process_group = self.process_group,
            path = %self.path.display(),
            interval_ms = self.interval.as_millis() as u64,
            "Data recording started"
        );

        let mut ticker = time::interval(self.interval.max(Duration::from_millis(1)));
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.write_snapshot() {
                        tracing::warn!(process_group = self.process_group, error = %e, "Failed to record statistics");
                    }
                }
                _ = shutdown.recv() => {
                    break;
                }
            }
        }

        let result = self.write_snapshot();
        tracing::info!(process_group = self.process_group, "Data recording stopped");
        result
    }
}
