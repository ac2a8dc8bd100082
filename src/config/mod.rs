//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! <program>.config.json (or path given on the command line)
//!     → loader.rs (read & parse JSON, required-key check)
//!     → schema.rs (typed Settings)
//!     → validation.rs (semantic checks)
//!     → SettingsStore (validated, immutable)
//!     → read by startup and handed to every managed unit
//! ```
//!
//! # Design Decisions
//! - The document is loaded once and never mutated; there is no reload
//! - Raw key lookups (`contains` / `get`) and the typed view come from the
//!   same document
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{default_config_path, ConfigError, SettingsStore};
pub use schema::Settings;
pub use validation::ValidationError;
