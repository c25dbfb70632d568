//! Cognitive profile - human-interpretable projection of belief
//!
//! A profile is derived, read-only and always recomputable from the belief
//! state and hypothesis space; it is never a source of truth.

use crate::inference::BayesianEngine;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A snapshot summary of what the engine currently believes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveProfile {
    /// Highest-posterior hypothesis, if any (id, name)
    pub dominant_hypothesis: Option<(Uuid, String)>,

    /// Posterior of the dominant hypothesis
    pub confidence: f64,

    /// Posterior-weighted mean of each cognitive attribute
    ///
    /// Hypotheses silent on an attribute are excluded from that attribute's
    /// average entirely, not treated as zero.
    pub attribute_scores: HashMap<String, f64>,

    /// Number of live hypotheses at build time
    pub hypothesis_count: usize,

    /// Number of evidence records applied at build time
    pub evidence_count: usize,

    /// When the profile was built
    pub built_at: Timestamp,
}

/// Builds profiles from the current belief state; side-effect-free
#[derive(Debug, Clone, Copy, Default)]
pub struct CognitiveProfileBuilder;

impl CognitiveProfileBuilder {
    /// Project the engine's belief state into a profile
    pub fn build(engine: &BayesianEngine) -> CognitiveProfile {
        let dominant = engine.most_likely();
        let confidence = dominant
            .and_then(|h| engine.space().posterior(&h.id))
            .unwrap_or(0.0);

        // Weighted sums per attribute over the hypotheses that define it.
        let mut weighted: HashMap<String, (f64, f64)> = HashMap::new();
        for (hypothesis, posterior) in engine.space().iter_with_posteriors() {
            for (attribute, value) in &hypothesis.cognitive_attributes {
                let entry = weighted.entry(attribute.clone()).or_insert((0.0, 0.0));
                entry.0 += posterior * value;
                entry.1 += posterior;
            }
        }

        let attribute_scores = weighted
            .into_iter()
            .filter(|(_, (_, mass))| *mass > 0.0)
            .map(|(attribute, (sum, mass))| (attribute, sum / mass))
            .collect();

        let metrics = engine.convergence_metrics();
        CognitiveProfile {
            dominant_hypothesis: dominant.map(|h| (h.id, h.name.clone())),
            confidence,
            attribute_scores,
            hypothesis_count: metrics.hypothesis_count,
            evidence_count: metrics.evidence_count,
            built_at: crate::types::now(),
        }
    }
}
