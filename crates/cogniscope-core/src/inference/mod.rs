//! Inference - The belief-update machinery
//!
//! This module holds the algorithmic heart of Cogniscope:
//!
//! - `LikelihoodModel` scores how well a response fits a hypothesis
//! - `HypothesisSpace` owns hypothesis records and the current belief state
//! - `BayesianEngine` drives sequential belief updates and convergence metrics
//! - `SurpriseDetector` measures how poorly the ensemble predicted a response
//! - `HypothesisValidator` scores candidate hypotheses against history
//!
//! The whole path is synchronous and single-writer: evidence is applied one
//! pair at a time, and every update renormalizes the full posterior.

pub mod engine;
pub mod likelihood;
pub mod space;
pub mod surprise;
pub mod validator;

// Re-export main types
pub use engine::{BayesianEngine, ConvergenceMetrics, EngineConfig, EngineSnapshot};
pub use likelihood::LikelihoodModel;
pub use space::{BeliefState, HypothesisSpace};
pub use surprise::{HypothesisLikelihood, SurpriseContext, SurpriseDetector};
pub use validator::{HypothesisValidator, ValidationReport};
