//! Error types for run-count estimation

use thiserror::Error;

/// Errors raised by the detection-probability model and the run-count search
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("Invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },

    #[error("Degenerate search: {reason}")]
    DegenerateSearch { reason: String },

    #[error("Invalid search configuration: {0}")]
    InvalidConfig(String),
}

impl EstimateError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        EstimateError::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }
}

/// Result type for estimation operations
pub type Result<T> = std::result::Result<T, EstimateError>;
