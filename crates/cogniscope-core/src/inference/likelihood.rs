//! Likelihood model - P(response | hypothesis, scenario)
//!
//! Scores how well an observed response fits a hypothesis for the scenario's
//! pattern key. Matching is deliberately simple: case-insensitive substring
//! containment of pattern tokens, combined by taking the maximum matched
//! weight. Anything smarter than pattern matching belongs to an external
//! collaborator, not this engine.

use crate::model::{CognitiveHypothesis, LLMResponse, ProbingScenario};
use serde::{Deserialize, Serialize};

/// Likelihood scorer shared by every hypothesis
///
/// Two smoothing constants govern the edges of the scale:
///
/// - `floor`: the minimum score. A hypothesis whose patterns all miss is
///   clamped here rather than to zero, so one observation can never
///   mathematically eliminate it; only many observations can drive it
///   arbitrarily small.
/// - `neutral`: the score when the hypothesis has no entry for the
///   scenario's pattern key at all. An open-domain response the hypothesis
///   is silent about is not evidence against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodModel {
    /// Laplace-style floor; scores never reach 0
    pub floor: f64,

    /// Smoothed likelihood for an unknown pattern key
    pub neutral: f64,
}

impl Default for LikelihoodModel {
    fn default() -> Self {
        Self {
            floor: 1e-3,
            neutral: 0.5,
        }
    }
}

impl LikelihoodModel {
    /// Create a model with custom smoothing constants
    pub fn new(floor: f64, neutral: f64) -> Self {
        Self { floor, neutral }
    }

    /// Score a response against a hypothesis for the scenario's pattern key
    ///
    /// Returns a value in `(0, 1]`. Failure markers score neutral: a call
    /// that produced no text says nothing about any hypothesis.
    pub fn score(
        &self,
        hypothesis: &CognitiveHypothesis,
        scenario: &ProbingScenario,
        response: &LLMResponse,
    ) -> f64 {
        if response.is_failure() {
            return self.neutral;
        }

        let patterns = match hypothesis.patterns_for(&scenario.pattern_key()) {
            Some(patterns) if !patterns.is_empty() => patterns,
            _ => return self.neutral,
        };

        let text = response.raw_response.to_lowercase();

        // Max of matched weights: independent of pattern-map iteration order.
        let mut best: Option<f64> = None;
        for (token, weight) in patterns {
            if text.contains(&token.to_lowercase()) {
                best = Some(best.map_or(*weight, |b: f64| b.max(*weight)));
            }
        }

        best.unwrap_or(0.0).clamp(self.floor, 1.0)
    }
}
