//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stdout (text, compact, or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields (process_group, state) on every lifecycle event
//! - Logging is configured from the config document's `logging` object
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
