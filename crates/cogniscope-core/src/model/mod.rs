//! Data Model - The vocabulary of cognitive probing
//!
//! This module defines the immutable records the engine operates on:
//!
//! - What are we asking? (`ProbingScenario`)
//! - What theories compete to explain the answers? (`CognitiveHypothesis`)
//! - What did the model actually say? (`LLMResponse`)
//! - What have we seen so far? (`EvidenceRecord`)
//!
//! Records validate at construction and never mutate afterwards; the only
//! mutable belief in the system lives in the engine's `BeliefState`.

pub mod hypothesis;
pub mod response;
pub mod scenario;

// Re-export main types
pub use hypothesis::{CognitiveHypothesis, CognitiveHypothesisBuilder};
pub use response::{EvidenceRecord, LLMResponse};
pub use scenario::{ProbingScenario, ProbingScenarioBuilder};
