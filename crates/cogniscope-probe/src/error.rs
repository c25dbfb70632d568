//! Error types for the probing layer

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for probing operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Errors raised by the probing session
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Core engine errors
    #[error("Engine error: {0}")]
    Core(#[from] cogniscope_core::CoreError),

    /// Scenario lookup failures
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(Uuid),
}
