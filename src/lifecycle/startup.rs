//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Configure logging and, optionally, the metrics exporter
//! - Install termination signal handlers
//! - Construct every managed unit
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and nothing is started
//! - Signal handlers are installed before units exist, so an early signal
//!   is remembered and observed once startup completes

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use crate::config::SettingsStore;
use crate::error::OrchestratorError;
use crate::lifecycle::orchestrator::Orchestrator;
use crate::lifecycle::signals::{install_signal_handlers, TerminationSignal};
use crate::observability::{logging, metrics};
use crate::unit::UnitFactory;

/// Run the initialization phase and hand back a built orchestrator.
pub fn initialize(
    config_path: Option<&Path>,
    factory: &dyn UnitFactory,
) -> Result<Orchestrator, OrchestratorError> {
    let store = SettingsStore::load(config_path)?;
    let settings = store.settings();

    logging::init_logging(settings.logging.as_ref())?;

    tracing::info!(
        path = %store.path().display(),
        config_db = %settings.config_db_path.display(),
        process_groups = ?settings.process_groups,
        recording = settings.records_statistics(),
        "Configuration loaded"
    );

    if let Some(address) = &settings.metrics_address {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| OrchestratorError::Metrics(format!("{address}: {e}")))?;
        metrics::init_metrics(addr).map_err(OrchestratorError::Metrics)?;
    }

    let signal = Arc::new(TerminationSignal::new());
    // Listener task lives for the rest of the process
    let _listener =
        install_signal_handlers(signal.clone()).map_err(OrchestratorError::Signals)?;

    Orchestrator::build(settings.clone(), signal, factory)
}
