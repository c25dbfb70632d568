//! Candidate validation against the historical evidence log
//!
//! A generated hypothesis earns admission by explaining history, not by
//! sounding plausible. The fit score is the mean likelihood of the candidate
//! over every recorded (scenario, response) pair: a perfect, consistent
//! explainer scores near 1, a candidate that contradicts all history scores
//! near the likelihood floor.

use crate::inference::likelihood::LikelihoodModel;
use crate::model::{CognitiveHypothesis, EvidenceRecord};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outcome of validating one candidate hypothesis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Mean likelihood over the evidence log
    pub score: f64,

    /// Number of evidence records scored
    pub sample_size: usize,

    /// 95% normal-approximation confidence interval for the score
    pub confidence_interval: (f64, f64),

    /// Whether the score clears the configured threshold
    pub accepted: bool,
}

/// Scores candidate hypotheses against the full evidence log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisValidator {
    /// Minimum fit score for admission
    pub threshold: f64,
}

impl Default for HypothesisValidator {
    fn default() -> Self {
        Self { threshold: 0.4 }
    }
}

impl HypothesisValidator {
    /// Create a validator with an explicit acceptance threshold
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Score a candidate against every historical (scenario, response) pair
    ///
    /// An empty evidence log yields score 0 and rejection: a candidate with
    /// no history to explain has earned nothing.
    pub fn validate(
        &self,
        candidate: &CognitiveHypothesis,
        likelihood: &LikelihoodModel,
        evidence: &[EvidenceRecord],
    ) -> ValidationReport {
        if evidence.is_empty() {
            return ValidationReport {
                score: 0.0,
                sample_size: 0,
                confidence_interval: (0.0, 1.0),
                accepted: false,
            };
        }

        let total: f64 = evidence
            .iter()
            .map(|record| likelihood.score(candidate, &record.scenario, &record.response))
            .sum();
        let sample_size = evidence.len();
        let score = total / sample_size as f64;
        let accepted = score > self.threshold;

        info!(
            candidate = %candidate.name,
            score,
            sample_size,
            accepted,
            "validated candidate hypothesis"
        );

        ValidationReport {
            score,
            sample_size,
            confidence_interval: confidence_interval(score, sample_size),
            accepted,
        }
    }
}

/// 95% normal-approximation interval, clamped to [0, 1]
fn confidence_interval(score: f64, sample_size: usize) -> (f64, f64) {
    if sample_size < 2 {
        return (0.0, 1.0);
    }

    let std_error = (score * (1.0 - score) / sample_size as f64).sqrt();
    let margin = 1.96 * std_error;
    ((score - margin).max(0.0), (score + margin).min(1.0))
}
