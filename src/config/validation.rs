//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - At least one process group (repeats are allowed)
//! - Non-empty paths
//! - Parsable metrics address
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before the document is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::Settings;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("process_groups must not be empty")]
    NoProcessGroups,

    #[error("{0} must not be empty")]
    EmptyPath(&'static str),

    #[error("metrics_address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a deserialized configuration.
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.process_groups.is_empty() {
        errors.push(ValidationError::NoProcessGroups);
    }

    if settings.config_db_path.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyPath("config_db_path"));
    }

    if let Some(path) = &settings.statistics_db_path {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyPath("statistics_db_path"));
        }
    }

    if let Some(addr) = &settings.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(groups: Vec<i64>) -> Settings {
        Settings {
            config_db_path: PathBuf::from("config.db"),
            process_groups: groups,
            logging: None,
            statistics_db_path: None,
            metrics_address: None,
        }
    }

    #[test]
    fn accepts_minimal_settings() {
        assert!(validate_settings(&settings(vec![1, 2, 3])).is_ok());
    }

    #[test]
    fn rejects_empty_process_groups() {
        let errors = validate_settings(&settings(vec![])).unwrap_err();
        assert_eq!(errors, vec![ValidationError::NoProcessGroups]);
    }

    #[test]
    fn accepts_repeated_process_groups() {
        assert!(validate_settings(&settings(vec![1, 1])).is_ok());
    }

    #[test]
    fn reports_every_problem() {
        let mut s = settings(vec![4]);
        s.config_db_path = PathBuf::new();
        s.metrics_address = Some("not-an-address".into());

        let errors = validate_settings(&s).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyPath("config_db_path"),
                ValidationError::InvalidMetricsAddress("not-an-address".into()),
            ]
        );
    }
}
