//! Managed units: one per configured process group.
//!
//! # Data Flow
//! ```text
//! Orchestrator
//!     → UnitFactory::build(config_db_path, process_group)
//!     → Box<dyn ManagedUnit>
//!
//! ProcessGroupHost (host.rs):
//!     config DB → agent definitions for its process group
//!     start_agents          → one agent task per definition (agent.rs)
//!     start_data_recording  → recorder task (recorder.rs)
//!     stop_agents           → Shutdown broadcast → await every task
//! ```
//!
//! # Design Decisions
//! - The orchestrator only sees the trait; any implementation is interchangeable
//! - Units own their tasks; nothing outside a unit holds their handles
//! - All calls are fallible; the orchestrator decides what a failure means

pub mod agent;
pub mod host;
pub mod recorder;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use host::{HostFactory, ProcessGroupHost};

/// Errors raised by a managed unit.
#[derive(Debug, Error)]
pub enum UnitError {
    /// The persisted configuration store could not be read.
    #[error("cannot read config db {path}: {source}")]
    ConfigDb {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The persisted configuration store is not in the expected format.
    #[error("invalid config db {path}: {source}")]
    InvalidConfigDb {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The call is not valid in the unit's current state.
    #[error("process group {process_group}: {reason}")]
    InvalidState {
        process_group: i64,
        reason: &'static str,
    },

    /// Telemetry output could not be opened or written.
    #[error("statistics output {path}: {source}")]
    Recording {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A background task panicked or was cancelled.
    #[error("process group {process_group}: task {task} failed: {reason}")]
    Task {
        process_group: i64,
        task: String,
        reason: String,
    },

    /// Failure reported by an external implementation.
    #[error("{0}")]
    Other(String),
}

/// One hosted process group, as seen by the orchestrator.
#[async_trait]
pub trait ManagedUnit: Send + Sync {
    /// Process group this unit hosts.
    fn process_group(&self) -> i64;

    /// Start the unit's background agents.
    async fn start_agents(&mut self) -> Result<(), UnitError>;

    /// Stop the unit's background agents and wait for them to finish.
    async fn stop_agents(&mut self) -> Result<(), UnitError>;

    /// Start recording telemetry to `path`.
    async fn start_data_recording(&mut self, path: &Path) -> Result<(), UnitError>;
}

/// Builds managed units during orchestrator initialization.
pub trait UnitFactory: Send + Sync {
    fn build(
        &self,
        config_db_path: &Path,
        process_group: i64,
    ) -> Result<Box<dyn ManagedUnit>, UnitError>;
}
