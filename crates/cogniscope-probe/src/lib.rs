//! Cogniscope Probe - async collaborator boundary for the inference engine
//!
//! This crate owns everything that touches a language model:
//!
//! - **Provider** (`provider`): the `LanguageModel` trait plus a
//!   deterministic `ScriptedModel` stub
//! - **Generator** (`generator`): turns surprising observations into
//!   candidate hypotheses via the generative collaborator
//! - **Session** (`session`): scenario registry, bounded-concurrency
//!   dispatch, single-writer evidence drain and the surprise →
//!   generate → validate → admit pipeline
//!
//! The core engine stays synchronous; this crate is the only place where
//! async I/O happens, and every returned piece of evidence is applied to
//! the belief state one pair at a time.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod error;
pub mod generator;
pub mod provider;
pub mod session;

// Re-export commonly used types for convenience
pub use error::{ProbeError, Result};
pub use generator::{GenerationOutcome, GenerationRecord, GenerationStats, HypothesisGenerator};
pub use provider::{Completion, LanguageModel, ScriptedModel};
pub use session::{Observation, ProbeSession, SessionConfig, SessionSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
