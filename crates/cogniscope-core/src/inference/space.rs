//! Hypothesis space - exclusive owner of hypotheses and belief
//!
//! The space maps hypothesis identity to its definition and current posterior
//! weight. Registration order is kept explicitly: every deterministic
//! tie-break in the engine (dominant hypothesis, eviction) resolves toward
//! the earliest-registered hypothesis.

use crate::error::{HypothesisError, Result};
use crate::model::CognitiveHypothesis;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// The current probability distribution over all registered hypotheses
///
/// Entries are in hypothesis registration order. Values are non-negative and
/// sum to 1 within floating-point tolerance; the state is recomputed by
/// renormalization, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    entries: Vec<(Uuid, f64)>,
}

impl BeliefState {
    pub(crate) fn new(entries: Vec<(Uuid, f64)>) -> Self {
        Self { entries }
    }

    /// Posterior probability of a hypothesis, if registered
    pub fn probability(&self, id: &Uuid) -> Option<f64> {
        self.entries.iter().find(|(h, _)| h == id).map(|(_, p)| *p)
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, f64)> {
        self.entries.iter().map(|(id, p)| (id, *p))
    }

    /// Number of hypotheses
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the state is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all probabilities (1.0 within tolerance for a live state)
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    /// Shannon entropy in bits; zero contributions for zero probabilities
    ///
    /// 0 when belief has collapsed onto one hypothesis, `log2(N)` at uniform
    /// belief over N hypotheses.
    pub fn entropy(&self) -> f64 {
        self.entries
            .iter()
            .filter(|(_, p)| *p > 0.0)
            .map(|(_, p)| -p * p.log2())
            .sum()
    }

    /// Largest posterior value, 0.0 for an empty state
    pub fn max_posterior(&self) -> f64 {
        self.entries.iter().map(|(_, p)| *p).fold(0.0, f64::max)
    }
}

/// Owner of hypothesis records and their posterior weights
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HypothesisSpace {
    hypotheses: HashMap<Uuid, CognitiveHypothesis>,
    posteriors: HashMap<Uuid, f64>,
    /// Registration order; drives deterministic iteration and tie-breaks
    order: Vec<Uuid>,
}

impl HypothesisSpace {
    /// Create an empty space
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hypothesis with posterior = prior, then renormalize
    ///
    /// # Errors
    ///
    /// Returns `Err` if the identifier is already registered.
    pub fn insert(&mut self, hypothesis: CognitiveHypothesis) -> Result<Uuid> {
        let id = hypothesis.id;
        if self.hypotheses.contains_key(&id) {
            return Err(HypothesisError::Duplicate(id).into());
        }

        debug!(name = %hypothesis.name, %id, "registered hypothesis");
        self.posteriors.insert(id, hypothesis.prior_probability);
        self.hypotheses.insert(id, hypothesis);
        self.order.push(id);
        self.renormalize();
        Ok(id)
    }

    /// Remove a hypothesis and renormalize the remainder
    ///
    /// # Errors
    ///
    /// Returns `Err` if the identifier is unknown.
    pub fn remove(&mut self, id: &Uuid) -> Result<CognitiveHypothesis> {
        let hypothesis = self
            .hypotheses
            .remove(id)
            .ok_or(HypothesisError::NotFound(*id))?;
        self.posteriors.remove(id);
        self.order.retain(|h| h != id);
        self.renormalize();
        debug!(name = %hypothesis.name, %id, "removed hypothesis");
        Ok(hypothesis)
    }

    /// Evict the lowest-posterior hypothesis; ties resolve to the earliest
    /// registered. Returns the evicted record, `None` on an empty space.
    pub fn evict_lowest(&mut self) -> Option<CognitiveHypothesis> {
        // Strict < keeps the first-registered hypothesis among ties.
        let mut victim: Option<(Uuid, f64)> = None;
        for id in &self.order {
            let posterior = self.posteriors.get(id).copied().unwrap_or(0.0);
            match victim {
                Some((_, best)) if posterior >= best => {}
                _ => victim = Some((*id, posterior)),
            }
        }

        let (victim, _) = victim?;
        let evicted = self.remove(&victim).ok()?;
        warn!(name = %evicted.name, id = %victim, "evicted lowest-posterior hypothesis");
        Some(evicted)
    }

    /// Replace all posteriors and renormalize
    ///
    /// Missing entries are treated as zero. This is the single write path
    /// for belief updates.
    pub(crate) fn set_posteriors(&mut self, unnormalized: HashMap<Uuid, f64>) {
        for id in &self.order {
            let weight = unnormalized.get(id).copied().unwrap_or(0.0);
            self.posteriors.insert(*id, weight);
        }
        self.renormalize();
    }

    /// Renormalize posteriors to sum to 1; a degenerate all-zero state
    /// falls back to uniform
    pub(crate) fn renormalize(&mut self) {
        if self.order.is_empty() {
            return;
        }
        let total: f64 = self.posteriors.values().sum();
        if total > 0.0 {
            for p in self.posteriors.values_mut() {
                *p /= total;
            }
        } else {
            let uniform = 1.0 / self.order.len() as f64;
            for p in self.posteriors.values_mut() {
                *p = uniform;
            }
        }
    }

    /// Reset every posterior back to its prior, renormalized
    pub fn reset_to_priors(&mut self) {
        for id in &self.order {
            if let Some(h) = self.hypotheses.get(id) {
                self.posteriors.insert(*id, h.prior_probability);
            }
        }
        self.renormalize();
    }

    /// Look up a hypothesis
    pub fn get(&self, id: &Uuid) -> Option<&CognitiveHypothesis> {
        self.hypotheses.get(id)
    }

    /// Current posterior of a hypothesis
    pub fn posterior(&self, id: &Uuid) -> Option<f64> {
        self.posteriors.get(id).copied()
    }

    /// Hypotheses in registration order
    pub fn iter(&self) -> impl Iterator<Item = &CognitiveHypothesis> {
        self.order.iter().filter_map(|id| self.hypotheses.get(id))
    }

    /// (hypothesis, posterior) pairs in registration order
    pub fn iter_with_posteriors(&self) -> impl Iterator<Item = (&CognitiveHypothesis, f64)> {
        self.order.iter().filter_map(|id| {
            let h = self.hypotheses.get(id)?;
            let p = self.posteriors.get(id).copied()?;
            Some((h, p))
        })
    }

    /// Snapshot of the current belief state, in registration order
    pub fn belief_state(&self) -> BeliefState {
        BeliefState::new(
            self.order
                .iter()
                .map(|id| (*id, self.posteriors.get(id).copied().unwrap_or(0.0)))
                .collect(),
        )
    }

    /// Number of registered hypotheses
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the space holds no hypotheses
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hypothesis(name: &str, prior: f64) -> CognitiveHypothesis {
        CognitiveHypothesis::builder()
            .name(name)
            .prior(prior)
            .build()
            .unwrap()
    }

    #[test]
    fn test_insert_normalizes_priors() {
        let mut space = HypothesisSpace::new();
        space.insert(hypothesis("A", 0.5)).unwrap();
        space.insert(hypothesis("B", 0.5)).unwrap();
        space.insert(hypothesis("C", 0.5)).unwrap();

        let state = space.belief_state();
        assert!((state.total() - 1.0).abs() < 1e-9);
        for (_, p) in state.iter() {
            assert!((p - 1.0 / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut space = HypothesisSpace::new();
        let h = hypothesis("A", 0.5);
        let dup = h.clone();
        space.insert(h).unwrap();
        assert!(space.insert(dup).is_err());
    }

    #[test]
    fn test_remove_renormalizes() {
        let mut space = HypothesisSpace::new();
        let a = space.insert(hypothesis("A", 0.5)).unwrap();
        space.insert(hypothesis("B", 0.5)).unwrap();

        space.remove(&a).unwrap();
        assert_eq!(space.len(), 1);
        assert!((space.belief_state().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_evict_lowest_posterior() {
        let mut space = HypothesisSpace::new();
        space.insert(hypothesis("A", 0.6)).unwrap();
        space.insert(hypothesis("B", 0.1)).unwrap();
        space.insert(hypothesis("C", 0.3)).unwrap();

        let evicted = space.evict_lowest().unwrap();
        assert_eq!(evicted.name, "B");
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_evict_tie_resolves_to_earliest() {
        let mut space = HypothesisSpace::new();
        space.insert(hypothesis("First", 0.5)).unwrap();
        space.insert(hypothesis("Second", 0.5)).unwrap();

        let evicted = space.evict_lowest().unwrap();
        assert_eq!(evicted.name, "First");
    }

    #[test]
    fn test_zero_mass_falls_back_to_uniform() {
        let mut space = HypothesisSpace::new();
        space.insert(hypothesis("A", 0.0)).unwrap();
        space.insert(hypothesis("B", 0.0)).unwrap();

        let state = space.belief_state();
        for (_, p) in state.iter() {
            assert!((p - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_belief_state_entropy_bounds() {
        let collapsed = BeliefState::new(vec![(Uuid::new_v4(), 1.0), (Uuid::new_v4(), 0.0)]);
        assert_eq!(collapsed.entropy(), 0.0);

        let n = 8;
        let uniform = BeliefState::new(
            (0..n)
                .map(|_| (Uuid::new_v4(), 1.0 / n as f64))
                .collect(),
        );
        assert!((uniform.entropy() - (n as f64).log2()).abs() < 1e-9);
    }
}
