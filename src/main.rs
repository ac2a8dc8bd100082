//! Process group orchestrator.
//!
//! # Architecture Overview
//!
//! ```text
//!   <program>.config.json
//!          │
//!          ▼
//!   ┌──────────────┐   ┌───────────────┐   ┌──────────────────────────────┐
//!   │    config    │──▶│   lifecycle   │──▶│ unit (one per process group) │
//!   │ SettingsStore│   │   startup     │   │  agents + optional recorder  │
//!   └──────────────┘   └───────┬───────┘   └──────────────────────────────┘
//!                              │
//!        SIGINT/SIGTERM ──▶ TerminationSignal ──▶ stop units in build order
//!
//!   observability: tracing logs, optional Prometheus metrics
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use iot_orchestrator::lifecycle::startup;
use iot_orchestrator::HostFactory;

#[derive(Parser)]
#[command(name = "iot-orchestrator", version)]
#[command(about = "Hosts one managed unit per configured process group", long_about = None)]
struct Cli {
    /// Configuration file [default: <program name>.config.json]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let factory = HostFactory::new();

    let orchestrator = match startup::initialize(cli.config.as_deref(), &factory) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("iot-orchestrator: {e}");
            return ExitCode::FAILURE;
        }
    };

    match orchestrator.run().await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Orchestrator exited with errors");
            eprintln!("iot-orchestrator: {e}");
            ExitCode::FAILURE
        }
    }
}
