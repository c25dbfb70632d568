//! Cogniscope Core - Bayesian inference engine for cognitive pattern analysis
//!
//! Cogniscope probes a target language model with structured scenarios and
//! infers, via sequential Bayesian updating, which of several competing
//! cognitive hypotheses best explains its responses.
//!
//! # Architecture
//!
//! The engine is built from small synchronous parts:
//!
//! 1. **Data model** (`model`): immutable scenarios, hypotheses, responses and evidence
//! 2. **Likelihood** (`inference::likelihood`): pattern-match scoring with smoothing floors
//! 3. **Bayesian engine** (`inference::engine`): belief updates and convergence metrics
//! 4. **Surprise** (`inference::surprise`): ensemble information content of an observation
//! 5. **Validation** (`inference::validator`): admission scoring for generated hypotheses
//! 6. **Profile** (`profile`): human-interpretable projection of the belief state
//!
//! # Quick Start
//!
//! ```
//! use cogniscope_core::inference::BayesianEngine;
//! use cogniscope_core::model::{CognitiveHypothesis, LLMResponse, ProbingScenario};
//! use cogniscope_core::types::{CognitiveDomain, PatternKey, ResponseType};
//!
//! let key = PatternKey::new(CognitiveDomain::EthicalReasoning, ResponseType::BinaryChoice);
//!
//! let mut engine = BayesianEngine::new();
//! engine.add_hypothesis(
//!     CognitiveHypothesis::builder()
//!         .name("Utilitarian")
//!         .pattern(key, "yes", 0.9)
//!         .prior(0.5)
//!         .build()
//!         .unwrap(),
//! ).unwrap();
//! engine.add_hypothesis(
//!     CognitiveHypothesis::builder()
//!         .name("Deontological")
//!         .pattern(key, "yes", 0.1)
//!         .prior(0.5)
//!         .build()
//!         .unwrap(),
//! ).unwrap();
//!
//! let scenario = ProbingScenario::builder()
//!     .domain(CognitiveDomain::EthicalReasoning)
//!     .response_type(ResponseType::BinaryChoice)
//!     .prompt("Would you pull the lever? Answer yes or no.")
//!     .build()
//!     .unwrap();
//! let response = LLMResponse::new(scenario.id, "probed-model", "yes, I would").unwrap();
//!
//! let state = engine.update_beliefs(&scenario, &response).unwrap();
//! assert!(state.max_posterior() > 0.89);
//! ```
//!
//! # Design Principles
//!
//! 1. **Single source of truth**: posteriors live in the belief state, never on hypotheses
//! 2. **No elimination by one miss**: likelihoods are floored, never exactly zero
//! 3. **Single-writer belief**: updates apply one at a time and always renormalize
//! 4. **Soft failure**: unknown patterns and failed calls degrade, they never abort a session

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod error;
pub mod inference;
pub mod model;
pub mod profile;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{CoreError, EngineError, HypothesisError, Result, ScenarioError};
pub use inference::{
    BayesianEngine, BeliefState, ConvergenceMetrics, EngineConfig, EngineSnapshot,
    HypothesisSpace, HypothesisValidator, LikelihoodModel, SurpriseContext, SurpriseDetector,
    ValidationReport,
};
pub use model::{CognitiveHypothesis, EvidenceRecord, LLMResponse, ProbingScenario};
pub use profile::{CognitiveProfile, CognitiveProfileBuilder};
pub use types::{CognitiveDomain, PatternKey, ResponseType, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;

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

    fn engine_with(weights: &[(f64, f64)]) -> BayesianEngine {
        // One hypothesis per (prior, safe-weight) pair.
        let mut engine = BayesianEngine::new();
        for (i, (prior, weight)) in weights.iter().enumerate() {
            engine
                .add_hypothesis(
                    CognitiveHypothesis::builder()
                        .name(format!("H{i}"))
                        .pattern(key(), "safe", *weight)
                        .pattern(key(), "risky", 1.0 - *weight)
                        .prior(*prior)
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        engine
    }

    fn respond(scenario: &ProbingScenario, text: &str) -> LLMResponse {
        LLMResponse::new(scenario.id, "probe", text).unwrap()
    }

    proptest! {
        #[test]
        fn posteriors_sum_to_one_for_any_update_sequence(
            priors in proptest::collection::vec(0.01f64..1.0, 2..6),
            picks in proptest::collection::vec(0usize..2, 1..12),
        ) {
            let weights: Vec<(f64, f64)> = priors
                .iter()
                .enumerate()
                .map(|(i, p)| (*p, (i as f64 + 1.0) / (priors.len() as f64 + 1.0)))
                .collect();
            let mut engine = engine_with(&weights);
            let scenario = scenario();

            for pick in picks {
                let text = if pick == 0 { "safe bonds" } else { "risky stocks" };
                let state = engine.update_beliefs(&scenario, &respond(&scenario, text)).unwrap();
                prop_assert!((state.total() - 1.0).abs() < 1e-6);
            }
        }

        #[test]
        fn evidence_order_does_not_change_final_posteriors(
            weight_a in 0.05f64..0.95,
            weight_b in 0.05f64..0.95,
        ) {
            let weights = [(0.5, weight_a), (0.5, weight_b)];
            let scenario = scenario();
            let e1 = respond(&scenario, "safe bonds");
            let e2 = respond(&scenario, "risky stocks");

            let mut forward = engine_with(&weights);
            forward.update_beliefs(&scenario, &e1).unwrap();
            let forward_state = forward.update_beliefs(&scenario, &e2).unwrap();

            let mut backward = engine_with(&weights);
            backward.update_beliefs(&scenario, &e2).unwrap();
            let backward_state = backward.update_beliefs(&scenario, &e1).unwrap();

            // Hypothesis ids differ between the two engines; compare by
            // registration position.
            let fw: Vec<f64> = forward_state.iter().map(|(_, p)| p).collect();
            let bw: Vec<f64> = backward_state.iter().map(|(_, p)| p).collect();
            for (a, b) in fw.iter().zip(bw.iter()) {
                prop_assert!((a - b).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_entropy_collapses_with_consistent_evidence() {
        let mut engine = engine_with(&[(0.5, 0.95), (0.5, 0.05)]);
        let scenario = scenario();

        let initial_entropy = engine.convergence_metrics().entropy;
        for _ in 0..12 {
            engine
                .update_beliefs(&scenario, &respond(&scenario, "safe bonds"))
                .unwrap();
        }
        let final_metrics = engine.convergence_metrics();

        assert!(final_metrics.entropy < initial_entropy);
        assert!(final_metrics.entropy < 0.1);
        assert!(final_metrics.max_posterior > 0.98);
    }

    #[test]
    fn test_full_surprise_validate_admit_cycle() {
        let mut engine = engine_with(&[(0.5, 0.9), (0.5, 0.8)]);
        let detector = SurpriseDetector::default();
        let validator = HypothesisValidator::default();
        let scenario = scenario();

        // Build history that no current hypothesis explains.
        for _ in 0..3 {
            engine
                .update_beliefs(&scenario, &respond(&scenario, "I refuse to invest at all"))
                .unwrap();
        }

        let probe = respond(&scenario, "I refuse to invest at all");
        let surprise =
            detector.calculate_surprise(engine.space(), engine.likelihood(), &scenario, &probe);
        assert!(detector.is_surprising(surprise));

        // A candidate that predicts the refusal pattern explains history.
        let candidate = CognitiveHypothesis::builder()
            .name("Abstainer")
            .pattern(key(), "refuse", 0.95)
            .build()
            .unwrap();
        let report = validator.validate(&candidate, engine.likelihood(), engine.evidence());
        assert!(report.accepted);

        let id = engine.admit_hypothesis(candidate).unwrap();
        let state = engine
            .update_beliefs(&scenario, &respond(&scenario, "again, I refuse"))
            .unwrap();
        assert!(state.probability(&id).unwrap() > 0.5);
    }
}
