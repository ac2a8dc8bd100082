//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Interpret the configuration document's `logging` object
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, text/compact for development
//! - Without a `logging` object the level comes from `RUST_LOG`

use std::io::IsTerminal;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when the configuration has no `logging` object and `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "iot_orchestrator=info";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid logging configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("cannot install subscriber: {0}")]
    Install(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Compact,
    Json,
}

/// Native schema of the `logging` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Global level when no `filter` is given.
    pub level: String,

    /// Full `EnvFilter` directives, e.g. "iot_orchestrator=debug,warn".
    pub filter: Option<String>,

    pub format: LogFormat,

    /// Colored output (text and compact formats only).
    pub ansi: bool,

    /// Include the event target in each line.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filter: None,
            format: LogFormat::Text,
            ansi: false,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn from_value(value: &Value) -> Result<Self, LoggingError> {
        Ok(Self::deserialize(value)?)
    }

    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        let directives = self.filter.as_deref().unwrap_or(&self.level);
        Ok(EnvFilter::try_new(directives)?)
    }
}

/// Install the global subscriber from the `logging` object, if any.
pub fn init_logging(value: Option<&Value>) -> Result<(), LoggingError> {
    let Some(value) = value else {
        return tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
            )
            .with(fmt::layer().with_ansi(std::io::stdout().is_terminal()))
            .try_init()
            .map_err(|e| LoggingError::Install(e.to_string()));
    };

    let config = LoggingConfig::from_value(value)?;
    let registry = tracing_subscriber::registry().with(config.env_filter()?);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(config.with_target))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_ansi(config.ansi)
                    .with_target(config.with_target),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_ansi(config.ansi)
                    .with_target(config.with_target),
            )
            .try_init(),
    };

    installed.map_err(|e| LoggingError::Install(e.to_string()))
}
