//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::schema::{Settings, REQUIRED_KEYS};
use crate::config::validation::{validate_settings, ValidationError};

/// Appended to the program name to form the default configuration file name.
pub const CONFIG_SUFFIX: &str = ".config.json";

/// Error type for configuration loading and lookup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid JSON object: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing configuration key {0:?}")]
    MissingKey(String),

    #[error("configuration has the wrong shape: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read-only access to the configuration document.
///
/// Holds both the raw top-level mapping (for `contains` / `get`) and the
/// typed [`Settings`] derived from it at load time.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    document: Map<String, Value>,
    settings: Settings,
}

impl SettingsStore {
    /// Load from `path`, or from [`default_config_path`] when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        Self::from_content(&content, path)
    }

    /// Parse a document held in memory.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_content(content, PathBuf::from("<memory>"))
    }

    fn from_content(content: &str, path: PathBuf) -> Result<Self, ConfigError> {
        let document: Map<String, Value> =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;

        if let Some(key) = REQUIRED_KEYS.iter().find(|k| !document.contains_key(**k)) {
            return Err(ConfigError::MissingKey((*key).to_string()));
        }

        let settings: Settings = serde_json::from_value(Value::Object(document.clone()))
            .map_err(ConfigError::Schema)?;
        validate_settings(&settings).map_err(ConfigError::Validation)?;

        Ok(Self {
            path,
            document,
            settings,
        })
    }

    /// Whether `key` is present at the top level of the document.
    pub fn contains(&self, key: &str) -> bool {
        self.document.contains_key(key)
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Result<&Value, ConfigError> {
        self.document
            .get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Typed view of the document.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// File the document was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Default configuration path: the invoking program's base name with
/// [`CONFIG_SUFFIX`], relative to the current working directory.
pub fn default_config_path() -> PathBuf {
    let program = std::env::args_os()
        .next()
        .map(PathBuf::from)
        .or_else(|| std::env::current_exe().ok())
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_PKG_NAME")));
    config_file_name(&program)
}

/// Configuration file name derived from a program path.
pub fn config_file_name(program: &Path) -> PathBuf {
    let stem = program
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    PathBuf::from(format!("{stem}{CONFIG_SUFFIX}"))
}
