//! Dynamic hypothesis generation from surprising behavior
//!
//! When the belief ensemble fails to predict a response, the generator asks
//! the generative collaborator for a candidate hypothesis shaped like the
//! domain schema, as JSON. Any provider failure or malformed reply produces
//! no candidate; the session keeps operating on its current hypothesis set.

use crate::provider::LanguageModel;
use cogniscope_core::inference::SurpriseContext;
use cogniscope_core::model::{CognitiveHypothesis, LLMResponse, ProbingScenario};
use cogniscope_core::types::{PatternKey, Timestamp};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const GENERATION_PROMPT: &str = r#"As a cognitive scientist analyzing AI behavior, generate a new hypothesis to explain unexpected LLM behavior.

CONTEXT:
- Scenario domain: {domain}
- Scenario: {scenario}
- LLM response: {response}
- Why it was surprising: {surprise}
- Current leading hypotheses: {hypotheses}

TASK:
Propose one new cognitive hypothesis that could explain this behavior. Give it a clear name, a scientific description, predicted response patterns per scenario type, and cognitive attributes on a 0-1 scale.

FORMAT YOUR RESPONSE AS JSON:
{
    "name": "Clear hypothesis name",
    "description": "Scientific description of the cognitive pattern",
    "predicted_patterns": {
        "ethical_reasoning_binary_choice": {"utilitarian": 0.8, "deontological": 0.2}
    },
    "cognitive_attributes": {
        "risk_tolerance": 0.6,
        "rule_adherence": 0.4
    },
    "confidence": 0.75
}"#;

/// How many characters of the raw response to quote in the prompt
const RESPONSE_EXCERPT_LEN: usize = 200;

/// How many existing hypotheses to summarize in the prompt
const HYPOTHESIS_SUMMARY_LEN: usize = 5;

/// Proposal schema expected back from the generative collaborator
#[derive(Debug, Deserialize)]
struct HypothesisProposal {
    name: String,
    description: String,
    #[serde(default)]
    predicted_patterns: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    cognitive_attributes: HashMap<String, f64>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Outcome of one generation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    /// A well-formed candidate was produced
    Proposed {
        /// Identifier of the candidate
        hypothesis_id: Uuid,
        /// Name the collaborator gave it
        name: String,
    },
    /// The collaborator call failed; no candidate
    ProviderFailure,
    /// The reply could not be parsed against the schema; no candidate
    ParseFailure,
}

/// Diagnostic record of one generation attempt
///
/// Kept in memory by the generator, independent of the evidence log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// When the attempt happened
    pub timestamp: Timestamp,
    /// Scenario whose response triggered the attempt
    pub trigger_scenario: Uuid,
    /// The surprising response itself
    pub trigger_response: Uuid,
    /// Surprise score at trigger time
    pub surprise_score: f64,
    /// What the attempt produced
    pub outcome: GenerationOutcome,
}

/// Summary statistics over the generation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Total generation attempts
    pub total_attempts: usize,
    /// Attempts that produced a well-formed candidate
    pub proposed: usize,
    /// Attempts lost to collaborator failures
    pub provider_failures: usize,
    /// Attempts lost to malformed replies
    pub parse_failures: usize,
    /// Mean surprise score across attempts
    pub average_surprise: f64,
}

/// Generates candidate hypotheses from surprising observations
pub struct HypothesisGenerator {
    model: Arc<dyn LanguageModel>,
    history: Vec<GenerationRecord>,
    json_pattern: Regex,
}

impl std::fmt::Debug for HypothesisGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HypothesisGenerator")
            .field("model", &self.model.name())
            .field("history", &self.history.len())
            .finish()
    }
}

impl HypothesisGenerator {
    /// Create a generator backed by the given collaborator
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            history: Vec::new(),
            // First top-level JSON object in the reply; models often wrap
            // the JSON in prose.
            json_pattern: Regex::new(r"(?s)\{.*\}").expect("static regex"),
        }
    }

    /// Request a candidate hypothesis explaining a surprising observation
    ///
    /// Returns `None` on provider failure or a malformed reply; both are
    /// soft outcomes recorded in the generation history, never fatal to the
    /// calling session.
    pub async fn generate(
        &mut self,
        scenario: &ProbingScenario,
        response: &LLMResponse,
        surprise: &SurpriseContext,
        existing: &[(&CognitiveHypothesis, f64)],
    ) -> Option<CognitiveHypothesis> {
        let prompt = self.build_prompt(scenario, response, surprise, existing);

        let reply = match self.model.complete(&prompt).await {
            Ok(completion) => completion.text,
            Err(error) => {
                warn!(%error, "generative collaborator failed; no candidate produced");
                self.record(scenario, response, surprise, GenerationOutcome::ProviderFailure);
                return None;
            }
        };

        match self.parse_candidate(&reply, scenario, response) {
            Some(candidate) => {
                info!(name = %candidate.name, "generated candidate hypothesis");
                self.record(
                    scenario,
                    response,
                    surprise,
                    GenerationOutcome::Proposed {
                        hypothesis_id: candidate.id,
                        name: candidate.name.clone(),
                    },
                );
                Some(candidate)
            }
            None => {
                warn!("generation reply failed schema parse; no candidate produced");
                self.record(scenario, response, surprise, GenerationOutcome::ParseFailure);
                None
            }
        }
    }

    /// Generation history, oldest first
    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    /// Restore a previously exported history
    pub fn restore_history(&mut self, history: Vec<GenerationRecord>) {
        self.history = history;
    }

    /// Summary statistics over all attempts
    pub fn stats(&self) -> GenerationStats {
        let total_attempts = self.history.len();
        let proposed = self
            .history
            .iter()
            .filter(|r| matches!(r.outcome, GenerationOutcome::Proposed { .. }))
            .count();
        let provider_failures = self
            .history
            .iter()
            .filter(|r| r.outcome == GenerationOutcome::ProviderFailure)
            .count();
        let parse_failures = self
            .history
            .iter()
            .filter(|r| r.outcome == GenerationOutcome::ParseFailure)
            .count();
        let average_surprise = if total_attempts == 0 {
            0.0
        } else {
            self.history.iter().map(|r| r.surprise_score).sum::<f64>() / total_attempts as f64
        };

        GenerationStats {
            total_attempts,
            proposed,
            provider_failures,
            parse_failures,
            average_surprise,
        }
    }

    fn build_prompt(
        &self,
        scenario: &ProbingScenario,
        response: &LLMResponse,
        surprise: &SurpriseContext,
        existing: &[(&CognitiveHypothesis, f64)],
    ) -> String {
        let excerpt: String = response.raw_response.chars().take(RESPONSE_EXCERPT_LEN).collect();

        let mut surprise_notes = vec![format!("surprise score {:.2}", surprise.surprise_score)];
        let failed: Vec<&str> = surprise
            .hypothesis_analysis
            .iter()
            .filter(|h| h.likelihood < 0.3)
            .map(|h| h.name.as_str())
            .take(3)
            .collect();
        if !failed.is_empty() {
            surprise_notes.push(format!("low-likelihood hypotheses: {}", failed.join(", ")));
        }

        let hypotheses_summary = if existing.is_empty() {
            "none".to_string()
        } else {
            existing
                .iter()
                .take(HYPOTHESIS_SUMMARY_LEN)
                .map(|(h, p)| format!("- {} (posterior {:.2}): {}", h.name, p, h.description))
                .collect::<Vec<_>>()
                .join("\n")
        };

        GENERATION_PROMPT
            .replace("{domain}", scenario.domain.as_str())
            .replace(
                "{scenario}",
                &format!("{}: {}", scenario.title, scenario.description),
            )
            .replace("{response}", &excerpt)
            .replace("{surprise}", &surprise_notes.join("; "))
            .replace("{hypotheses}", &hypotheses_summary)
    }

    /// Parse a collaborator reply into a domain hypothesis
    fn parse_candidate(
        &self,
        reply: &str,
        scenario: &ProbingScenario,
        response: &LLMResponse,
    ) -> Option<CognitiveHypothesis> {
        let json = self.json_pattern.find(reply)?.as_str();
        let proposal: HypothesisProposal = match serde_json::from_str(json) {
            Ok(proposal) => proposal,
            Err(error) => {
                debug!(%error, "proposal JSON rejected");
                return None;
            }
        };

        if proposal.name.trim().is_empty() {
            return None;
        }

        let confidence = proposal.confidence.unwrap_or(0.5);
        let prior = (confidence * 0.2).clamp(0.05, 0.2);

        let mut builder = CognitiveHypothesis::builder()
            .name(proposal.name)
            .description(proposal.description)
            .prior(prior)
            .metadata("generated_dynamically", "true")
            .metadata("trigger_scenario", scenario.id.to_string())
            .metadata("trigger_response", response.id.to_string())
            .metadata("generation_confidence", format!("{confidence:.3}"));

        for (raw_key, patterns) in proposal.predicted_patterns {
            match PatternKey::parse(&raw_key) {
                Some(key) => builder = builder.patterns(key, patterns),
                None => debug!(key = %raw_key, "dropping unrecognized pattern key"),
            }
        }
        for (attribute, value) in proposal.cognitive_attributes {
            builder = builder.attribute(attribute, value);
        }

        // Out-of-range weights or attributes fail the build: schema failure,
        // not a crash.
        match builder.build() {
            Ok(candidate) => Some(candidate),
            Err(error) => {
                debug!(%error, "proposal rejected by domain validation");
                None
            }
        }
    }

    fn record(
        &mut self,
        scenario: &ProbingScenario,
        response: &LLMResponse,
        surprise: &SurpriseContext,
        outcome: GenerationOutcome,
    ) {
        self.history.push(GenerationRecord {
            timestamp: chrono::Utc::now(),
            trigger_scenario: scenario.id,
            trigger_response: response.id,
            surprise_score: surprise.surprise_score,
            outcome,
        });
    }
}
