//! Process group orchestrator library.
//!
//! Loads the deployment configuration, hosts one managed unit per process
//! group, and stops them all in order when a termination signal arrives.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod unit;

pub use config::{Settings, SettingsStore};
pub use error::OrchestratorError;
pub use lifecycle::{LifecycleState, Orchestrator, TerminationSignal};
pub use unit::{HostFactory, ManagedUnit, UnitError, UnitFactory};
