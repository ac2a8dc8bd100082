//! Configuration schema definitions.
//!
//! This module defines the typed view of the orchestrator's configuration
//! document. All types derive Serde traits for deserialization from JSON.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level keys that must be present in every configuration document.
pub const REQUIRED_KEYS: [&str; 2] = ["config_db_path", "process_groups"];

/// Root configuration for the orchestrator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Path to the persisted configuration store read by every managed unit.
    pub config_db_path: PathBuf,

    /// Process groups to host, one managed unit each, in start order.
    pub process_groups: Vec<i64>,

    /// Logging configuration, handed to the logging subsystem untouched.
    #[serde(default)]
    pub logging: Option<serde_json::Value>,

    /// Where units record telemetry. Recording is off when absent.
    #[serde(default)]
    pub statistics_db_path: Option<PathBuf>,

    /// Bind address for the Prometheus scrape endpoint (e.g. "127.0.0.1:9090").
    #[serde(default)]
    pub metrics_address: Option<String>,
}

impl Settings {
    /// Whether units should start data recording.
    pub fn records_statistics(&self) -> bool {
        self.statistics_db_path.is_some()
    }
}
