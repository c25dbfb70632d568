//! Error types for the Cogniscope core engine
//!
//! This module defines all error types used throughout the inference engine.
//! We use `thiserror` for ergonomic error definitions with automatic Display/Error implementations.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for core engine operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for core engine operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Data-model construction errors
    #[error("Hypothesis error: {0}")]
    Hypothesis(#[from] HypothesisError),

    /// Scenario construction errors
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Inference engine errors
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        source: Box<CoreError>,
    },
}

/// Errors raised while constructing or registering a hypothesis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HypothesisError {
    #[error("Hypothesis name cannot be empty")]
    EmptyName,

    #[error("Prior probability must be in [0.0, 1.0], got {0}")]
    InvalidPrior(f64),

    #[error("Pattern weight for '{token}' must be in [0.0, 1.0], got {weight}")]
    InvalidPatternWeight { token: String, weight: f64 },

    #[error("Cognitive attribute '{attribute}' must be in [0.0, 1.0], got {value}")]
    InvalidAttribute { attribute: String, value: f64 },

    #[error("Hypothesis already registered: {0}")]
    Duplicate(Uuid),

    #[error("Hypothesis not found: {0}")]
    NotFound(Uuid),
}

/// Errors raised while constructing a probing scenario
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("Scenario prompt cannot be empty")]
    EmptyPrompt,

    #[error("Difficulty level must be between 1 and 5, got {0}")]
    InvalidDifficulty(u8),

    #[error("Response raw text cannot be empty unless marked as failed")]
    EmptyResponse,
}

/// Errors raised by the Bayesian engine at runtime
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Belief update attempted with an empty hypothesis space")]
    NotReady,

    #[error("Snapshot posteriors do not match hypothesis set")]
    InconsistentSnapshot,
}

impl CoreError {
    /// Add context to an error
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context() {
        let err = CoreError::from(EngineError::NotReady);
        let err = err.context("Failed to apply evidence");

        assert!(err.to_string().contains("Failed to apply evidence"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(HypothesisError::EmptyName.into());
        let result = result.context("Hypothesis registration failed");

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Hypothesis registration failed"));
    }
}
