//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Configure logging → Install signal handlers → Build units
//!
//! Orchestrator (orchestrator.rs):
//!     Start units in order → Wait on TerminationSignal → Stop units in order
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → TerminationSignal::set (nothing else)
//!
//! Shutdown (shutdown.rs):
//!     Unit stop → broadcast to its agent and recorder tasks
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then signals, then units
//! - Construction order == start order == stop order
//! - Every started unit is stopped exactly once, even if another unit fails

pub mod orchestrator;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use orchestrator::{LifecycleState, Orchestrator, ShutdownReport};
pub use shutdown::Shutdown;
pub use signals::{install_signal_handlers, TerminationSignal};
