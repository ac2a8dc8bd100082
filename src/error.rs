//! Top-level error type for the orchestrator.

use thiserror::Error;

use crate::config::ConfigError;
use crate::observability::logging::LoggingError;
use crate::unit::UnitError;

/// Fatal errors surfaced at the process boundary.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("metrics exporter failed to start: {0}")]
    Metrics(String),

    #[error("cannot install signal handlers: {0}")]
    Signals(#[source] std::io::Error),

    #[error("cannot build unit for process group {process_group}: {source}")]
    UnitBuild {
        process_group: i64,
        #[source]
        source: UnitError,
    },

    #[error("cannot start process group {process_group}: {source}")]
    UnitStart {
        process_group: i64,
        #[source]
        source: UnitError,
    },

    #[error("{} unit(s) failed to stop: {}", .0.len(), describe(.0))]
    UnitStop(Vec<(i64, UnitError)>),
}

fn describe(failures: &[(i64, UnitError)]) -> String {
    failures
        .iter()
        .map(|(group, e)| format!("process group {group}: {e}"))
        .collect::<Vec<_>>()
        .join("; ")
}
