//! Error types for the investigator rules engine

use crate::validation::ValidationIssue;
use thiserror::Error;

/// Main error type for the investigator rules engine
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Invalid formula: {0}")]
    InvalidFormula(String),

    #[error("Invalid characteristic: {0}")]
    InvalidCharacteristic(String),

    #[error("Occupation not found: {0}")]
    OccupationNotFound(String),

    #[error("No occupation selected")]
    NoOccupationSelected,

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Inconsistent rulebook: {0}")]
    Catalog(String),

    #[error("Character cannot be finalized:\n{}", format_issues(.issues))]
    Finalization { issues: Vec<ValidationIssue> },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("- [{}] {} ({})", issue.code, issue.message, issue.field))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<serde_json::Error> for RulesError {
    fn from(err: serde_json::Error) -> Self {
        RulesError::Deserialization(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<RulesError> for pyo3::PyErr {
    fn from(err: RulesError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};

        match err {
            RulesError::InvalidFormula(msg) => {
                PyValueError::new_err(format!("Invalid formula: {}", msg))
            }
            RulesError::InvalidCharacteristic(key) => {
                PyKeyError::new_err(format!("Invalid characteristic: {}", key))
            }
            RulesError::OccupationNotFound(name) => {
                PyKeyError::new_err(format!("Occupation not found: {}", name))
            }
            RulesError::NoOccupationSelected => {
                PyValueError::new_err("No occupation selected".to_string())
            }
            RulesError::Deserialization(msg) => {
                PyValueError::new_err(format!("Deserialization error: {}", msg))
            }
            RulesError::Catalog(msg) => {
                PyValueError::new_err(format!("Inconsistent rulebook: {}", msg))
            }
            err @ RulesError::Finalization { .. } => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Result type alias for the investigator rules engine
pub type Result<T> = std::result::Result<T, RulesError>;
