//! Probing scenario data structure
//!
//! A scenario is a single structured prompt aimed at one cognitive domain.
//! Scenarios are immutable after construction; the builder validates the
//! invariants and fails fast on malformed input.

use crate::error::{Result, ScenarioError};
use crate::types::{CognitiveDomain, PatternKey, ResponseType, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A cognitive probing scenario for testing LLM reasoning patterns
///
/// # Invariants
///
/// - `prompt` is non-empty
/// - `difficulty` is in 1..=5
///
/// # Examples
///
/// ```
/// use cogniscope_core::model::ProbingScenario;
/// use cogniscope_core::types::{CognitiveDomain, ResponseType};
///
/// let scenario = ProbingScenario::builder()
///     .title("Trolley problem")
///     .domain(CognitiveDomain::EthicalReasoning)
///     .response_type(ResponseType::BinaryChoice)
///     .prompt("Would you divert the trolley? Answer yes or no.")
///     .difficulty(2)
///     .build()
///     .unwrap();
///
/// assert_eq!(scenario.pattern_key().to_string(), "ethical_reasoning_binary_choice");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbingScenario {
    /// Unique identifier
    pub id: Uuid,

    /// Short human-readable title
    pub title: String,

    /// Longer description of what the scenario probes
    pub description: String,

    /// Cognitive domain under test
    pub domain: CognitiveDomain,

    /// The prompt submitted to the probed model
    pub prompt: String,

    /// Expected shape of the response
    pub response_type: ResponseType,

    /// Difficulty on a 1-5 scale
    pub difficulty: u8,

    /// Free-form tags for categorization
    pub tags: Vec<String>,

    /// Arbitrary metadata
    pub metadata: HashMap<String, String>,

    /// Creation timestamp
    pub created_at: Timestamp,
}

impl ProbingScenario {
    /// Create a builder for fluent scenario construction
    pub fn builder() -> ProbingScenarioBuilder {
        ProbingScenarioBuilder::default()
    }

    /// The likelihood-lookup key for this scenario
    pub fn pattern_key(&self) -> PatternKey {
        PatternKey::new(self.domain, self.response_type)
    }
}

/// Builder for constructing scenarios fluently
#[derive(Debug)]
pub struct ProbingScenarioBuilder {
    title: String,
    description: String,
    domain: CognitiveDomain,
    prompt: String,
    response_type: ResponseType,
    difficulty: u8,
    tags: Vec<String>,
    metadata: HashMap<String, String>,
}

impl Default for ProbingScenarioBuilder {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            domain: CognitiveDomain::LogicalReasoning,
            prompt: String::new(),
            response_type: ResponseType::FreeText,
            difficulty: 1,
            tags: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}

impl ProbingScenarioBuilder {
    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the cognitive domain
    pub fn domain(mut self, domain: CognitiveDomain) -> Self {
        self.domain = domain;
        self
    }

    /// Set the prompt text
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Set the expected response type
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Set the difficulty (1-5)
    pub fn difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Add a tag
    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Add a metadata entry
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Validate and build the scenario
    ///
    /// # Errors
    ///
    /// Returns `Err` if the prompt is empty or the difficulty is out of range.
    pub fn build(self) -> Result<ProbingScenario> {
        if self.prompt.trim().is_empty() {
            return Err(ScenarioError::EmptyPrompt.into());
        }
        if !(1..=5).contains(&self.difficulty) {
            return Err(ScenarioError::InvalidDifficulty(self.difficulty).into());
        }

        Ok(ProbingScenario {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            domain: self.domain,
            prompt: self.prompt,
            response_type: self.response_type,
            difficulty: self.difficulty,
            tags: self.tags,
            metadata: self.metadata,
            created_at: crate::types::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_builder() {
        let scenario = ProbingScenario::builder()
            .title("Investment choice")
            .domain(CognitiveDomain::RiskAssessment)
            .response_type(ResponseType::BinaryChoice)
            .prompt("Choose between safe bonds and risky stocks.")
            .difficulty(3)
            .add_tag("finance")
            .build()
            .unwrap();

        assert_eq!(scenario.domain, CognitiveDomain::RiskAssessment);
        assert_eq!(scenario.difficulty, 3);
        assert_eq!(scenario.tags, vec!["finance".to_string()]);
    }

    #[test]
    fn test_scenario_rejects_empty_prompt() {
        let result = ProbingScenario::builder().title("No prompt").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_scenario_rejects_bad_difficulty() {
        let result = ProbingScenario::builder()
            .prompt("A prompt")
            .difficulty(6)
            .build();
        assert!(result.is_err());

        let result = ProbingScenario::builder()
            .prompt("A prompt")
            .difficulty(0)
            .build();
        assert!(result.is_err());
    }
}
