//! Bayesian engine - sequential belief updates over the hypothesis space
//!
//! Each observed (scenario, response) pair multiplies every posterior by its
//! likelihood and renormalizes, so the posterior of step *n* becomes the
//! prior of step *n+1*. Under conditional independence of observations the
//! final normalized posteriors are order-independent up to float rounding.
//!
//! The engine performs no I/O and mutates belief on a single writer path;
//! callers serialize `update_beliefs` and hypothesis admission against each
//! other.

use crate::error::{EngineError, Result};
use crate::inference::likelihood::LikelihoodModel;
use crate::inference::space::{BeliefState, HypothesisSpace};
use crate::model::{CognitiveHypothesis, EvidenceRecord, LLMResponse, ProbingScenario};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Engine tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cap on the hypothesis space; admission past the cap evicts the
    /// lowest-posterior hypothesis first. `None` disables the cap.
    pub max_hypotheses: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_hypotheses: Some(16),
        }
    }
}

/// Convergence metrics describing how settled the belief state is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceMetrics {
    /// Shannon entropy of the belief state, in bits
    pub entropy: f64,

    /// Largest posterior value
    pub max_posterior: f64,

    /// Number of evidence records applied
    pub evidence_count: usize,

    /// Number of live hypotheses
    pub hypothesis_count: usize,
}

/// Bayesian inference engine for updating beliefs about cognitive patterns
///
/// State machine: Uninitialized (no hypotheses) → Ready (≥1 hypothesis,
/// priors normalized) → Updated* (each `update_beliefs` yields a new Ready
/// state). The only failure modes are structural misuse: updating an empty
/// space or re-registering an identifier.
#[derive(Debug, Clone, Default)]
pub struct BayesianEngine {
    space: HypothesisSpace,
    likelihood: LikelihoodModel,
    evidence: Vec<EvidenceRecord>,
    config: EngineConfig,
}

impl BayesianEngine {
    /// Create an engine with default likelihood smoothing and config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with explicit likelihood model and config
    pub fn with_config(likelihood: LikelihoodModel, config: EngineConfig) -> Self {
        Self {
            space: HypothesisSpace::new(),
            likelihood,
            evidence: Vec::new(),
            config,
        }
    }

    /// Register a hypothesis
    ///
    /// Inserts with posterior = prior and renormalizes all posteriors. When
    /// the configured cap would be exceeded, the lowest-posterior hypothesis
    /// is evicted first.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the identifier is already registered.
    pub fn add_hypothesis(&mut self, hypothesis: CognitiveHypothesis) -> Result<Uuid> {
        if let Some(cap) = self.config.max_hypotheses {
            while self.space.len() >= cap.max(1) {
                self.space.evict_lowest();
            }
        }
        let name = hypothesis.name.clone();
        let id = self.space.insert(hypothesis)?;
        info!(%name, %id, hypotheses = self.space.len(), "added hypothesis");
        Ok(id)
    }

    /// Admit a validated candidate with a freshly assigned small prior
    ///
    /// The candidate's own prior is replaced by 1/(N+1) of existing mass so
    /// a newcomer never dominates established belief on arrival.
    pub fn admit_hypothesis(&mut self, mut hypothesis: CognitiveHypothesis) -> Result<Uuid> {
        hypothesis.prior_probability = 1.0 / (self.space.len() as f64 + 1.0);
        self.add_hypothesis(hypothesis)
    }

    /// Remove a hypothesis and renormalize the remainder
    pub fn remove_hypothesis(&mut self, id: &Uuid) -> Result<CognitiveHypothesis> {
        self.space.remove(id)
    }

    /// Apply one (scenario, response) pair with Bayes' rule
    ///
    /// For every live hypothesis: posterior' ∝ likelihood × posterior, then
    /// renormalize. The pair is appended to the evidence log and the new
    /// belief state returned. A failure-marker response is no evidence: the
    /// state is returned unchanged and nothing is logged or counted.
    ///
    /// # Errors
    ///
    /// Returns `Err` if no hypothesis is registered; this never silently
    /// no-ops.
    pub fn update_beliefs(
        &mut self,
        scenario: &ProbingScenario,
        response: &LLMResponse,
    ) -> Result<BeliefState> {
        if self.space.is_empty() {
            return Err(EngineError::NotReady.into());
        }

        if response.is_failure() {
            debug!(scenario = %scenario.id, "failure marker: skipping belief update");
            return Ok(self.space.belief_state());
        }

        let mut unnormalized: HashMap<Uuid, f64> = HashMap::new();
        for (hypothesis, posterior) in self.space.iter_with_posteriors() {
            let likelihood = self.likelihood.score(hypothesis, scenario, response);
            unnormalized.insert(hypothesis.id, likelihood * posterior);
        }

        self.space.set_posteriors(unnormalized);
        self.evidence
            .push(EvidenceRecord::new(scenario.clone(), response.clone()));

        debug!(
            scenario = %scenario.id,
            evidence = self.evidence.len(),
            "updated beliefs"
        );
        Ok(self.space.belief_state())
    }

    /// Current convergence metrics
    pub fn convergence_metrics(&self) -> ConvergenceMetrics {
        let state = self.space.belief_state();
        ConvergenceMetrics {
            entropy: state.entropy(),
            max_posterior: state.max_posterior(),
            evidence_count: self.evidence.len(),
            hypothesis_count: self.space.len(),
        }
    }

    /// Hypothesis with the highest posterior; ties resolve to the earliest
    /// registered. `None` on an empty space.
    pub fn most_likely(&self) -> Option<&CognitiveHypothesis> {
        let mut best: Option<(&CognitiveHypothesis, f64)> = None;
        for (hypothesis, posterior) in self.space.iter_with_posteriors() {
            match best {
                Some((_, p)) if posterior <= p => {}
                _ => best = Some((hypothesis, posterior)),
            }
        }
        best.map(|(h, _)| h)
    }

    /// Hypotheses ranked by posterior, descending; ties keep registration
    /// order (stable sort)
    pub fn ranking(&self) -> Vec<(&CognitiveHypothesis, f64)> {
        let mut ranked: Vec<_> = self.space.iter_with_posteriors().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    /// Reset all posteriors to normalized priors and clear the evidence log
    pub fn reset_beliefs(&mut self) {
        self.space.reset_to_priors();
        self.evidence.clear();
        info!("reset beliefs to priors");
    }

    /// Current belief state snapshot
    pub fn belief_state(&self) -> BeliefState {
        self.space.belief_state()
    }

    /// The hypothesis space (read-only)
    pub fn space(&self) -> &HypothesisSpace {
        &self.space
    }

    /// The shared likelihood model
    pub fn likelihood(&self) -> &LikelihoodModel {
        &self.likelihood
    }

    /// The append-only evidence log
    pub fn evidence(&self) -> &[EvidenceRecord] {
        &self.evidence
    }

    /// Export the full engine state as a plain serializable structure
    pub fn export_state(&self) -> EngineSnapshot {
        EngineSnapshot {
            config: self.config.clone(),
            likelihood: self.likelihood.clone(),
            hypotheses: self
                .space
                .iter_with_posteriors()
                .map(|(h, p)| HypothesisRecord {
                    hypothesis: h.clone(),
                    posterior: p,
                })
                .collect(),
            evidence: self.evidence.clone(),
        }
    }

    /// Reconstruct an engine from an exported snapshot
    ///
    /// The imported engine reproduces an identical belief state (same
    /// hypothesis set, same posteriors up to renormalization tolerance) and
    /// the same evidence count.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the snapshot contains duplicate hypothesis ids.
    pub fn import_state(snapshot: EngineSnapshot) -> Result<Self> {
        let mut space = HypothesisSpace::new();
        let mut posteriors: HashMap<Uuid, f64> = HashMap::new();

        for record in snapshot.hypotheses {
            if record.posterior < 0.0 {
                return Err(EngineError::InconsistentSnapshot.into());
            }
            posteriors.insert(record.hypothesis.id, record.posterior);
            space.insert(record.hypothesis)?;
        }
        space.set_posteriors(posteriors);

        Ok(Self {
            space,
            likelihood: snapshot.likelihood,
            evidence: snapshot.evidence,
            config: snapshot.config,
        })
    }
}

/// A hypothesis definition together with its exported posterior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisRecord {
    /// Full hypothesis definition, prior included
    pub hypothesis: CognitiveHypothesis,
    /// Posterior at export time
    pub posterior: f64,
}

/// Structurally lossless export of the engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Engine configuration
    pub config: EngineConfig,
    /// Likelihood smoothing constants
    pub likelihood: LikelihoodModel,
    /// Hypotheses in registration order, with priors and posteriors
    pub hypotheses: Vec<HypothesisRecord>,
    /// The append-only evidence log
    pub evidence: Vec<EvidenceRecord>,
}
