//! Surprise detection - information content under the ensemble belief
//!
//! Surprise measures how poorly the *current belief state* predicted an
//! observation, not how poorly any single hypothesis did. The ensemble
//! (marginal) likelihood of the response is
//! `Σ_h posterior(h) · likelihood(h)`, and surprise is its negative natural
//! log: high when every hypothesis, weighted by how much we currently
//! believe it, predicted something else.

use crate::inference::likelihood::LikelihoodModel;
use crate::inference::space::HypothesisSpace;
use crate::model::{LLMResponse, ProbingScenario};
use crate::types::CognitiveDomain;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Per-hypothesis contribution to an ensemble likelihood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisLikelihood {
    /// Hypothesis identifier
    pub id: Uuid,
    /// Hypothesis name
    pub name: String,
    /// Current posterior at measurement time
    pub posterior: f64,
    /// Individual likelihood of the response under this hypothesis
    pub likelihood: f64,
    /// posterior × likelihood, the term this hypothesis adds to the ensemble
    pub weighted: f64,
}

/// Full breakdown of one surprise measurement
///
/// Tells the hypothesis generator *which* hypotheses failed to predict the
/// observation and how badly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurpriseContext {
    /// Negative log of the ensemble likelihood
    pub surprise_score: f64,
    /// Whether the score exceeds the configured threshold
    pub is_surprising: bool,
    /// The threshold the score was compared against
    pub threshold: f64,
    /// Domain of the scenario that produced the observation
    pub scenario_domain: CognitiveDomain,
    /// Marginal likelihood of the response under current belief
    pub ensemble_likelihood: f64,
    /// Per-hypothesis breakdown, in registration order
    pub hypothesis_analysis: Vec<HypothesisLikelihood>,
}

/// Detector comparing ensemble information content against a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurpriseDetector {
    /// Natural-log-scale surprise threshold; plausible range 0.5-10
    pub threshold: f64,
}

impl Default for SurpriseDetector {
    fn default() -> Self {
        Self { threshold: 2.5 }
    }
}

impl SurpriseDetector {
    /// Create a detector with an explicit threshold
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Surprise score for a response under the current belief state
    ///
    /// `-ln(Σ_h posterior(h) · likelihood(h))`, always ≥ 0 given likelihoods
    /// in (0, 1]. Returns 0 for an empty space: with no belief there is
    /// nothing to be surprised about.
    pub fn calculate_surprise(
        &self,
        space: &HypothesisSpace,
        likelihood: &LikelihoodModel,
        scenario: &ProbingScenario,
        response: &LLMResponse,
    ) -> f64 {
        if space.is_empty() {
            return 0.0;
        }

        let ensemble = self.ensemble_likelihood(space, likelihood, scenario, response);
        if ensemble <= 0.0 {
            return f64::INFINITY;
        }
        -ensemble.ln()
    }

    /// Threshold comparison
    pub fn is_surprising(&self, surprise_score: f64) -> bool {
        surprise_score > self.threshold
    }

    /// Surprise score plus the per-hypothesis breakdown behind it
    pub fn surprise_context(
        &self,
        space: &HypothesisSpace,
        likelihood: &LikelihoodModel,
        scenario: &ProbingScenario,
        response: &LLMResponse,
    ) -> SurpriseContext {
        let mut analysis = Vec::with_capacity(space.len());
        let mut ensemble = 0.0;

        for (hypothesis, posterior) in space.iter_with_posteriors() {
            let score = likelihood.score(hypothesis, scenario, response);
            let weighted = posterior * score;
            ensemble += weighted;
            analysis.push(HypothesisLikelihood {
                id: hypothesis.id,
                name: hypothesis.name.clone(),
                posterior,
                likelihood: score,
                weighted,
            });
        }

        let surprise_score = if space.is_empty() {
            0.0
        } else if ensemble <= 0.0 {
            f64::INFINITY
        } else {
            -ensemble.ln()
        };

        debug!(
            scenario = %scenario.id,
            surprise = surprise_score,
            ensemble,
            "measured surprise"
        );

        SurpriseContext {
            surprise_score,
            is_surprising: self.is_surprising(surprise_score),
            threshold: self.threshold,
            scenario_domain: scenario.domain,
            ensemble_likelihood: ensemble,
            hypothesis_analysis: analysis,
        }
    }

    fn ensemble_likelihood(
        &self,
        space: &HypothesisSpace,
        likelihood: &LikelihoodModel,
        scenario: &ProbingScenario,
        response: &LLMResponse,
    ) -> f64 {
        space
            .iter_with_posteriors()
            .map(|(h, posterior)| posterior * likelihood.score(h, scenario, response))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CognitiveHypothesis;
    use crate::types::{PatternKey, ResponseType};

    fn key() -> PatternKey {
        PatternKey::new(CognitiveDomain::RiskAssessment, ResponseType::BinaryChoice)
    }

    fn scenario() -> ProbingScenario {
        ProbingScenario::builder()
            .title("Investment choice")
            .domain(CognitiveDomain::RiskAssessment)
            .response_type(ResponseType::BinaryChoice)
            .prompt("Safe bonds or risky stocks?")
            .build()
            .unwrap()
    }

    fn space_with(yes_weight: f64) -> HypothesisSpace {
        let mut space = HypothesisSpace::new();
        space
            .insert(
                CognitiveHypothesis::builder()
                    .name("Risk Averse")
                    .pattern(key(), "safe", yes_weight)
                    .prior(1.0)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        space
    }

    fn response(text: &str) -> LLMResponse {
        LLMResponse::new(Uuid::new_v4(), "test", text).unwrap()
    }

    #[test]
    fn test_no_hypotheses_no_surprise() {
        let detector = SurpriseDetector::default();
        let space = HypothesisSpace::new();
        let surprise = detector.calculate_surprise(
            &space,
            &LikelihoodModel::default(),
            &scenario(),
            &response("I choose the risky stock"),
        );
        assert_eq!(surprise, 0.0);
    }

    #[test]
    fn test_matching_response_is_near_zero_surprise() {
        // Dominant hypothesis predicts "safe" with weight ~1.0: surprise ≈ 0.
        let detector = SurpriseDetector::default();
        let space = space_with(1.0);
        let surprise = detector.calculate_surprise(
            &space,
            &LikelihoodModel::default(),
            &scenario(),
            &response("I choose safe bonds"),
        );
        assert!(surprise < 0.05);
    }

    #[test]
    fn test_unmatched_response_exceeds_threshold() {
        let detector = SurpriseDetector::default();
        let space = space_with(0.9);
        let surprise = detector.calculate_surprise(
            &space,
            &LikelihoodModel::default(),
            &scenario(),
            &response("I choose the extremely volatile cryptocurrency"),
        );
        // Ensemble collapses to the likelihood floor: -ln(1e-3) ≈ 6.9.
        assert!(detector.is_surprising(surprise));
    }

    #[test]
    fn test_surprise_monotonicity() {
        let detector = SurpriseDetector::default();
        let space = space_with(0.9);
        let model = LikelihoodModel::default();

        let low = detector.calculate_surprise(&space, &model, &scenario(), &response("safe bonds"));
        let high = detector.calculate_surprise(
            &space,
            &model,
            &scenario(),
            &response("volatile cryptocurrency"),
        );
        assert!(high > low);
    }

    #[test]
    fn test_surprise_context_breakdown() {
        let detector = SurpriseDetector::new(0.5);
        let space = space_with(0.9);
        let context = detector.surprise_context(
            &space,
            &LikelihoodModel::default(),
            &scenario(),
            &response("something else entirely"),
        );

        assert_eq!(context.scenario_domain, CognitiveDomain::RiskAssessment);
        assert_eq!(context.hypothesis_analysis.len(), 1);
        assert!(context.is_surprising);

        let entry = &context.hypothesis_analysis[0];
        assert_eq!(entry.name, "Risk Averse");
        assert!((entry.weighted - entry.posterior * entry.likelihood).abs() < 1e-12);
    }
}
