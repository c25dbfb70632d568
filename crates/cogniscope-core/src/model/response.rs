//! Model responses and the evidence log
//!
//! `LLMResponse` is what comes back from the probed model; a failed call is
//! represented as an explicit failure marker rather than an error, so the
//! engine can skip it without counting it as evidence. `EvidenceRecord`
//! pairs a scenario with its response in the append-only session log.

use crate::error::{Result, ScenarioError};
use crate::model::ProbingScenario;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A response from the probed model to a probing scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMResponse {
    /// Unique identifier
    pub id: Uuid,

    /// Scenario this response answers
    pub scenario_id: Uuid,

    /// Name of the responding model
    pub model_name: String,

    /// Raw response text; empty only for failure markers
    pub raw_response: String,

    /// Wall-clock latency of the call
    pub response_time_ms: u64,

    /// Token count, when the provider reports one
    pub token_count: Option<u32>,

    /// Arbitrary metadata
    pub metadata: HashMap<String, String>,

    /// When the response was received
    pub timestamp: Timestamp,

    /// Explicit failure marker: the call produced no usable text
    pub failed: bool,
}

impl LLMResponse {
    /// Create a successful response
    ///
    /// # Errors
    ///
    /// Returns `Err` if the raw text is empty; an empty response must be
    /// recorded as a failure marker instead.
    pub fn new(
        scenario_id: Uuid,
        model_name: impl Into<String>,
        raw_response: impl Into<String>,
    ) -> Result<Self> {
        let raw_response = raw_response.into();
        if raw_response.trim().is_empty() {
            return Err(ScenarioError::EmptyResponse.into());
        }

        Ok(Self {
            id: Uuid::new_v4(),
            scenario_id,
            model_name: model_name.into(),
            raw_response,
            response_time_ms: 0,
            token_count: None,
            metadata: HashMap::new(),
            timestamp: crate::types::now(),
            failed: false,
        })
    }

    /// Create an explicit failure marker for a call that produced no text
    pub fn failure(scenario_id: Uuid, model_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            scenario_id,
            model_name: model_name.into(),
            raw_response: String::new(),
            response_time_ms: 0,
            token_count: None,
            metadata: HashMap::new(),
            timestamp: crate::types::now(),
            failed: true,
        }
    }

    /// Set the measured latency
    pub fn with_latency(mut self, response_time_ms: u64) -> Self {
        self.response_time_ms = response_time_ms;
        self
    }

    /// Set the reported token count
    pub fn with_token_count(mut self, token_count: u32) -> Self {
        self.token_count = Some(token_count);
        self
    }

    /// Whether this response is a failure marker (no evidence)
    pub fn is_failure(&self) -> bool {
        self.failed
    }
}

/// One observed (scenario, response) pair in the append-only evidence log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    /// The scenario that was run
    pub scenario: ProbingScenario,

    /// The response it produced
    pub response: LLMResponse,

    /// When the pair was appended to the log
    pub recorded_at: Timestamp,
}

impl EvidenceRecord {
    /// Record a (scenario, response) pair
    pub fn new(scenario: ProbingScenario, response: LLMResponse) -> Self {
        Self {
            scenario,
            response,
            recorded_at: crate::types::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_creation() {
        let response = LLMResponse::new(Uuid::new_v4(), "test-model", "I choose safe bonds")
            .unwrap()
            .with_latency(120)
            .with_token_count(6);

        assert!(!response.is_failure());
        assert_eq!(response.response_time_ms, 120);
        assert_eq!(response.token_count, Some(6));
    }

    #[test]
    fn test_response_rejects_empty_text() {
        assert!(LLMResponse::new(Uuid::new_v4(), "test-model", "   ").is_err());
    }

    #[test]
    fn test_failure_marker() {
        let response = LLMResponse::failure(Uuid::new_v4(), "test-model");
        assert!(response.is_failure());
        assert!(response.raw_response.is_empty());
    }
}
