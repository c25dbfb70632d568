//! Cognitive hypothesis data structure
//!
//! A hypothesis is a pure-data theory about how the probed model reasons:
//! predicted response patterns per (domain, response-type) key plus scalar
//! cognitive attributes. All hypotheses are scored by the one shared
//! likelihood function; there is no per-hypothesis behavior.
//!
//! The hypothesis record carries only its prior. The current posterior is
//! owned by the engine's `BeliefState` so there is a single source of truth
//! for belief.

use crate::error::{HypothesisError, Result};
use crate::types::{PatternKey, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A hypothesis about LLM cognitive patterns and reasoning style
///
/// # Invariants
///
/// - `name` is non-empty
/// - `prior_probability` is in [0.0, 1.0]
/// - every pattern weight and cognitive attribute value is in [0.0, 1.0]
///
/// # Examples
///
/// ```
/// use cogniscope_core::model::CognitiveHypothesis;
/// use cogniscope_core::types::{CognitiveDomain, PatternKey, ResponseType};
///
/// let key = PatternKey::new(CognitiveDomain::EthicalReasoning, ResponseType::BinaryChoice);
/// let hypothesis = CognitiveHypothesis::builder()
///     .name("Utilitarian")
///     .description("Maximizes aggregate outcomes")
///     .pattern(key, "yes", 0.9)
///     .attribute("rule_adherence", 0.2)
///     .prior(0.5)
///     .build()
///     .unwrap();
///
/// assert_eq!(hypothesis.name, "Utilitarian");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveHypothesis {
    /// Unique identifier within a hypothesis space
    pub id: Uuid,

    /// Short descriptive name
    pub name: String,

    /// Description of the proposed cognitive pattern
    pub description: String,

    /// Predicted response patterns: pattern key -> (token -> weight)
    ///
    /// A weight is the likelihood assigned to a response containing the
    /// token. A hypothesis silent on a pattern key is legal; scoring falls
    /// back to the smoothed neutral likelihood.
    pub predicted_response_patterns: HashMap<PatternKey, HashMap<String, f64>>,

    /// Scalar cognitive attributes on a 0-1 scale (e.g. risk_tolerance)
    pub cognitive_attributes: HashMap<String, f64>,

    /// Prior probability assigned at registration
    pub prior_probability: f64,

    /// Arbitrary metadata (provenance, generation context)
    pub metadata: HashMap<String, String>,

    /// Creation timestamp
    pub created_at: Timestamp,
}

impl CognitiveHypothesis {
    /// Create a builder for fluent hypothesis construction
    pub fn builder() -> CognitiveHypothesisBuilder {
        CognitiveHypothesisBuilder::default()
    }

    /// Predicted token weights for a pattern key, if any
    pub fn patterns_for(&self, key: &PatternKey) -> Option<&HashMap<String, f64>> {
        self.predicted_response_patterns.get(key)
    }

    /// Whether this hypothesis defines the given cognitive attribute
    pub fn defines_attribute(&self, attribute: &str) -> bool {
        self.cognitive_attributes.contains_key(attribute)
    }
}

/// Builder for constructing hypotheses fluently
#[derive(Debug, Default)]
pub struct CognitiveHypothesisBuilder {
    name: String,
    description: String,
    predicted_response_patterns: HashMap<PatternKey, HashMap<String, f64>>,
    cognitive_attributes: HashMap<String, f64>,
    prior_probability: Option<f64>,
    metadata: HashMap<String, String>,
}

impl CognitiveHypothesisBuilder {
    /// Set the name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a single predicted pattern weight
    pub fn pattern(mut self, key: PatternKey, token: impl Into<String>, weight: f64) -> Self {
        self.predicted_response_patterns
            .entry(key)
            .or_default()
            .insert(token.into(), weight);
        self
    }

    /// Set all predicted patterns for a key at once
    pub fn patterns(mut self, key: PatternKey, patterns: HashMap<String, f64>) -> Self {
        self.predicted_response_patterns.insert(key, patterns);
        self
    }

    /// Set a cognitive attribute
    pub fn attribute(mut self, attribute: impl Into<String>, value: f64) -> Self {
        self.cognitive_attributes.insert(attribute.into(), value);
        self
    }

    /// Set the prior probability
    pub fn prior(mut self, prior: f64) -> Self {
        self.prior_probability = Some(prior);
        self
    }

    /// Add a metadata entry
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Validate and build the hypothesis
    ///
    /// # Errors
    ///
    /// Returns `Err` on an empty name or any probability, pattern weight or
    /// attribute value outside [0.0, 1.0]. Never partially constructed.
    pub fn build(self) -> Result<CognitiveHypothesis> {
        if self.name.trim().is_empty() {
            return Err(HypothesisError::EmptyName.into());
        }

        let prior = self.prior_probability.unwrap_or(0.1);
        if !(0.0..=1.0).contains(&prior) {
            return Err(HypothesisError::InvalidPrior(prior).into());
        }

        for patterns in self.predicted_response_patterns.values() {
            for (token, weight) in patterns {
                if !(0.0..=1.0).contains(weight) {
                    return Err(HypothesisError::InvalidPatternWeight {
                        token: token.clone(),
                        weight: *weight,
                    }
                    .into());
                }
            }
        }

        for (attribute, value) in &self.cognitive_attributes {
            if !(0.0..=1.0).contains(value) {
                return Err(HypothesisError::InvalidAttribute {
                    attribute: attribute.clone(),
                    value: *value,
                }
                .into());
            }
        }

        Ok(CognitiveHypothesis {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            predicted_response_patterns: self.predicted_response_patterns,
            cognitive_attributes: self.cognitive_attributes,
            prior_probability: prior,
            metadata: self.metadata,
            created_at: crate::types::now(),
        })
    }
}
