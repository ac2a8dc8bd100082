//! Shared utilities for lifecycle integration tests.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use iot_orchestrator::{ManagedUnit, UnitError, UnitFactory};

/// A lifecycle call observed by a [`RecordingUnit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build(i64),
    Start(i64),
    Record(i64, PathBuf),
    Stop(i64),
}

/// Shared, ordered log of calls across all units of one test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn starts(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Start(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    #[allow(dead_code)]
    pub fn stops(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Stop(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    #[allow(dead_code)]
    pub fn recordings(&self) -> Vec<(i64, PathBuf)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Record(g, p) => Some((g, p)),
                _ => None,
            })
            .collect()
    }
}

pub struct RecordingUnit {
    process_group: i64,
    log: CallLog,
}

#[async_trait]
impl ManagedUnit for RecordingUnit {
    fn process_group(&self) -> i64 {
        self.process_group
    }

    async fn start_agents(&mut self) -> Result<(), UnitError> {
        self.log.push(Call::Start(self.process_group));
        Ok(())
    }

    async fn stop_agents(&mut self) -> Result<(), UnitError> {
        self.log.push(Call::Stop(self.process_group));
        Ok(())
    }

    async fn start_data_recording(&mut self, path: &Path) -> Result<(), UnitError> {
        self.log
            .push(Call::Record(self.process_group, path.to_path_buf()));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingFactory {
    pub log: CallLog,
}

impl UnitFactory for RecordingFactory {
    fn build(
        &self,
        _config_db_path: &Path,
        process_group: i64,
    ) -> Result<Box<dyn ManagedUnit>, UnitError> {
        self.log.push(Call::Build(process_group));
        Ok(Box::new(RecordingUnit {
            process_group,
            log: self.log.clone(),
        }))
    }
}

/// Write `content` as a config file in `dir` and return its path.
#[allow(dead_code)]
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("iot-orchestrator.config.json");
    std::fs::write(&path, content).unwrap();
    path
}
