//! Error types for the nexus analyzer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the nexus analyzer.
///
/// "No nexus" is never an error: missing rules, empty data and unimplemented
/// look-back rules are reported through [`crate::BreachResult`].
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// A caller broke the evaluator's input contract.
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Strict lookup of a state that has no configured rule.
    #[error("State '{0}' not found in configuration")]
    UnknownState(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a contract violation error.
    pub fn contract(msg: impl Into<String>) -> Self {
        Error::ContractViolation(msg.into())
    }

    /// Create an unknown state error.
    pub fn unknown_state(state: impl Into<String>) -> Self {
        Error::UnknownState(state.into())
    }

    /// Whether this error is a programming-contract violation rather than a
    /// runtime failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::ContractViolation(_) | Error::UnknownState(_))
    }
}
