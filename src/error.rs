//! Error types for the stabilization engine

use thiserror::Error;

/// Errors surfaced to callers of the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed landmark input (wrong element count, non-finite values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No classifier is loaded, so raw landmark frames cannot be classified
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),
}

impl EngineError {
    /// Stable machine-readable code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "invalid_input",
            EngineError::ClassifierUnavailable(_) => "classifier_unavailable",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
