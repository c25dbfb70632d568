//! Probing session - orchestrates scenarios, evidence and admission
//!
//! The session owns one engine, one generator and one scenario registry for
//! one probed model. Scenario execution is I/O-bound and may fan out with
//! bounded concurrency, but belief mutation stays single-writer: every
//! response funnels through `observe` one at a time, in arrival order, and
//! hypothesis admission is serialized on the same path. Failed calls are
//! drained as failure markers and never counted as evidence.

use crate::error::{ProbeError, Result};
use crate::generator::{GenerationRecord, HypothesisGenerator};
use crate::provider::LanguageModel;
use cogniscope_core::inference::{
    BayesianEngine, BeliefState, ConvergenceMetrics, EngineConfig, EngineSnapshot,
    HypothesisValidator, LikelihoodModel, SurpriseContext, SurpriseDetector,
};
use cogniscope_core::model::{CognitiveHypothesis, LLMResponse, ProbingScenario};
use cogniscope_core::profile::{CognitiveProfile, CognitiveProfileBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Session tuning parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent in-flight model calls during `run_all`
    pub max_concurrent: usize,

    /// Engine configuration (hypothesis cap)
    pub engine: EngineConfig,

    /// Likelihood smoothing constants
    pub likelihood: LikelihoodModel,

    /// Surprise threshold (natural-log scale)
    pub surprise_threshold: f64,

    /// Validation threshold for candidate admission
    pub validation_threshold: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            engine: EngineConfig::default(),
            likelihood: LikelihoodModel::default(),
            surprise_threshold: 2.5,
            validation_threshold: 0.4,
        }
    }
}

/// What one observation did to the session
#[derive(Debug, Clone)]
pub struct Observation {
    /// Belief state after the update
    pub belief: BeliefState,

    /// Surprise breakdown, absent for failure markers
    pub surprise: Option<SurpriseContext>,

    /// Identifier of a newly admitted hypothesis, if the observation was
    /// surprising and the generated candidate survived validation
    pub admitted: Option<Uuid>,
}

/// Structurally lossless export of the session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session configuration
    pub config: SessionConfig,
    /// Engine state: hypotheses, posteriors, evidence log
    pub engine: EngineSnapshot,
    /// Scenario registry, in registration order
    pub scenarios: Vec<ProbingScenario>,
    /// Responses received, failure markers included
    pub responses: Vec<LLMResponse>,
    /// Generation attempts, oldest first
    pub generation_history: Vec<GenerationRecord>,
}

/// A probing session against one language model
pub struct ProbeSession {
    model: Arc<dyn LanguageModel>,
    engine: BayesianEngine,
    detector: SurpriseDetector,
    validator: HypothesisValidator,
    generator: HypothesisGenerator,
    scenarios: HashMap<Uuid, ProbingScenario>,
    scenario_order: Vec<Uuid>,
    responses: Vec<LLMResponse>,
    config: SessionConfig,
}

impl std::fmt::Debug for ProbeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeSession")
            .field("model", &self.model.name())
            .field("scenarios", &self.scenario_order.len())
            .field("responses", &self.responses.len())
            .finish()
    }
}

impl ProbeSession {
    /// Create a session for the given probed model
    pub fn new(model: Arc<dyn LanguageModel>, config: SessionConfig) -> Self {
        Self {
            engine: BayesianEngine::with_config(config.likelihood.clone(), config.engine.clone()),
            detector: SurpriseDetector::new(config.surprise_threshold),
            validator: HypothesisValidator::new(config.validation_threshold),
            generator: HypothesisGenerator::new(Arc::clone(&model)),
            model,
            scenarios: HashMap::new(),
            scenario_order: Vec::new(),
            responses: Vec::new(),
            config,
        }
    }

    /// Register a probing scenario
    pub fn add_scenario(&mut self, scenario: ProbingScenario) -> Uuid {
        let id = scenario.id;
        debug!(title = %scenario.title, %id, "registered scenario");
        self.scenario_order.push(id);
        self.scenarios.insert(id, scenario);
        id
    }

    /// Register multiple scenarios
    pub fn add_scenarios(&mut self, scenarios: impl IntoIterator<Item = ProbingScenario>) {
        for scenario in scenarios {
            self.add_scenario(scenario);
        }
    }

    /// Register a hypothesis with the engine
    pub fn add_hypothesis(&mut self, hypothesis: CognitiveHypothesis) -> Result<Uuid> {
        Ok(self.engine.add_hypothesis(hypothesis)?)
    }

    /// Run one scenario: query the model, then observe the result
    ///
    /// # Errors
    ///
    /// Returns `Err` for an unknown scenario id or an engine without
    /// hypotheses. A provider failure is not an error; it drains through as
    /// a failure marker with no evidence.
    pub async fn run_scenario(&mut self, scenario_id: Uuid) -> Result<Observation> {
        let scenario = self
            .scenarios
            .get(&scenario_id)
            .cloned()
            .ok_or(ProbeError::ScenarioNotFound(scenario_id))?;

        let response = query_model(Arc::clone(&self.model), &scenario).await;
        self.responses.push(response.clone());
        self.observe(&scenario, &response).await
    }

    /// Run every registered scenario with bounded concurrency
    ///
    /// Model calls fan out up to `max_concurrent` at a time; all returned
    /// evidence is drained through the engine one pair at a time in arrival
    /// order, so the belief state never reflects a partial renormalization.
    pub async fn run_all(&mut self) -> Result<Vec<Observation>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel::<(ProbingScenario, LLMResponse)>();

        info!(
            scenarios = self.scenario_order.len(),
            max_concurrent = self.config.max_concurrent,
            "running all scenarios"
        );

        for id in &self.scenario_order {
            let Some(scenario) = self.scenarios.get(id).cloned() else {
                continue;
            };
            let model = Arc::clone(&self.model);
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let response = query_model(model, &scenario).await;
                let _ = tx.send((scenario, response));
            });
        }
        drop(tx);

        // Single-writer drain: one update at a time, arrival order.
        let mut observations = Vec::new();
        while let Some((scenario, response)) = rx.recv().await {
            self.responses.push(response.clone());
            observations.push(self.observe(&scenario, &response).await?);
        }

        info!(completed = observations.len(), "scenario run complete");
        Ok(observations)
    }

    /// Apply one (scenario, response) pair to the session
    ///
    /// Updates beliefs, measures surprise under the new state and, when
    /// surprised, runs the generate → validate → admit pipeline. Rejected
    /// candidates are logged and discarded, never silently added.
    pub async fn observe(
        &mut self,
        scenario: &ProbingScenario,
        response: &LLMResponse,
    ) -> Result<Observation> {
        let belief = self.engine.update_beliefs(scenario, response)?;

        if response.is_failure() {
            return Ok(Observation {
                belief,
                surprise: None,
                admitted: None,
            });
        }

        let context = self.detector.surprise_context(
            self.engine.space(),
            self.engine.likelihood(),
            scenario,
            response,
        );

        let mut admitted = None;
        if context.is_surprising {
            info!(
                surprise = context.surprise_score,
                scenario = %scenario.id,
                "surprising observation; requesting candidate hypothesis"
            );
            let ranking = self.engine.ranking();
            if let Some(candidate) = self
                .generator
                .generate(scenario, response, &context, &ranking)
                .await
            {
                let report =
                    self.validator
                        .validate(&candidate, self.engine.likelihood(), self.engine.evidence());
                if report.accepted {
                    let id = self.engine.admit_hypothesis(candidate)?;
                    info!(%id, score = report.score, "admitted generated hypothesis");
                    admitted = Some(id);
                } else {
                    warn!(
                        candidate = %candidate.name,
                        score = report.score,
                        "candidate rejected by historical validation"
                    );
                }
            }
        }

        Ok(Observation {
            belief: self.engine.belief_state(),
            surprise: Some(context),
            admitted,
        })
    }

    /// Build a cognitive profile from the current belief state
    pub fn profile(&self) -> CognitiveProfile {
        CognitiveProfileBuilder::build(&self.engine)
    }

    /// Current convergence metrics
    pub fn convergence_metrics(&self) -> ConvergenceMetrics {
        self.engine.convergence_metrics()
    }

    /// The underlying engine (read-only)
    pub fn engine(&self) -> &BayesianEngine {
        &self.engine
    }

    /// Responses received so far, failure markers included
    pub fn responses(&self) -> &[LLMResponse] {
        &self.responses
    }

    /// Generation history (read-only)
    pub fn generation_history(&self) -> &[GenerationRecord] {
        self.generator.history()
    }

    /// Export the full session state
    pub fn export(&self) -> SessionSnapshot {
        SessionSnapshot {
            config: self.config.clone(),
            engine: self.engine.export_state(),
            scenarios: self
                .scenario_order
                .iter()
                .filter_map(|id| self.scenarios.get(id).cloned())
                .collect(),
            responses: self.responses.clone(),
            generation_history: self.generator.history().to_vec(),
        }
    }

    /// Reconstruct a session from an exported snapshot
    ///
    /// # Errors
    ///
    /// Returns `Err` if the embedded engine snapshot is inconsistent.
    pub fn import(model: Arc<dyn LanguageModel>, snapshot: SessionSnapshot) -> Result<Self> {
        let engine = BayesianEngine::import_state(snapshot.engine)?;
        let mut generator = HypothesisGenerator::new(Arc::clone(&model));
        generator.restore_history(snapshot.generation_history);

        let scenario_order: Vec<Uuid> = snapshot.scenarios.iter().map(|s| s.id).collect();
        let scenarios = snapshot.scenarios.into_iter().map(|s| (s.id, s)).collect();

        Ok(Self {
            engine,
            detector: SurpriseDetector::new(snapshot.config.surprise_threshold),
            validator: HypothesisValidator::new(snapshot.config.validation_threshold),
            generator,
            model,
            scenarios,
            scenario_order,
            responses: snapshot.responses,
            config: snapshot.config,
        })
    }
}

/// Query the probed model with a scenario prompt
///
/// A provider failure becomes an explicit failure marker; the caller decides
/// what a marker means (the engine: no evidence).
async fn query_model(model: Arc<dyn LanguageModel>, scenario: &ProbingScenario) -> LLMResponse {
    match model.complete(&scenario.prompt).await {
        Ok(completion) => {
            match LLMResponse::new(scenario.id, completion.model.clone(), completion.text) {
                Ok(response) => response.with_latency(completion.response_time_ms),
                // Empty text from the provider is a failed call.
                Err(_) => LLMResponse::failure(scenario.id, completion.model),
            }
        }
        Err(error) => {
            warn!(scenario = %scenario.id, %error, "model call failed");
            LLMResponse::failure(scenario.id, model.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScriptedModel;
    use cogniscope_core::types::{CognitiveDomain, PatternKey, ResponseType};

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

    fn risk_averse() -> CognitiveHypothesis {
        CognitiveHypothesis::builder()
            .name("Risk Averse")
            .pattern(key(), "safe", 0.8)
            .pattern(key(), "risky", 0.2)
            .prior(0.5)
            .build()
            .unwrap()
    }

    fn risk_seeking() -> CognitiveHypothesis {
        CognitiveHypothesis::builder()
            .name("Risk Seeking")
            .pattern(key(), "safe", 0.2)
            .pattern(key(), "risky", 0.8)
            .prior(0.5)
            .build()
            .unwrap()
    }

    fn session_with(model: Arc<ScriptedModel>) -> ProbeSession {
        let mut session = ProbeSession::new(model, SessionConfig::default());
        session.add_hypothesis(risk_averse()).unwrap();
        session.add_hypothesis(risk_seeking()).unwrap();
        session
    }

    #[tokio::test]
    async fn test_run_scenario_updates_beliefs() {
        let model = Arc::new(ScriptedModel::new("stub"));
        model.push_reply("I would choose the safe bonds");

        let mut session = session_with(Arc::clone(&model));
        let id = session.add_scenario(scenario());

        let observation = session.run_scenario(id).await.unwrap();
        assert!(observation.belief.max_posterior() > 0.5);
        assert!(!observation.surprise.unwrap().is_surprising);
        assert_eq!(session.convergence_metrics().evidence_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_scenario_errors() {
        let model = Arc::new(ScriptedModel::new("stub"));
        let mut session = session_with(model);
        assert!(session.run_scenario(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test]
    async fn test_provider_failure_drains_as_no_evidence() {
        let model = Arc::new(ScriptedModel::new("stub"));
        model.push_failure("connection reset");

        let mut session = session_with(Arc::clone(&model));
        let id = session.add_scenario(scenario());

        let observation = session.run_scenario(id).await.unwrap();
        assert!(observation.surprise.is_none());
        assert_eq!(session.convergence_metrics().evidence_count, 0);
        assert_eq!(session.responses().len(), 1);
        assert!(session.responses()[0].is_failure());
    }

    #[tokio::test]
    async fn test_run_all_bounded_and_drained() {
        let model = Arc::new(ScriptedModel::new("stub").with_default_reply("safe bonds for me"));
        let mut session = session_with(Arc::clone(&model));
        for _ in 0..5 {
            session.add_scenario(scenario());
        }

        let observations = session.run_all().await.unwrap();
        assert_eq!(observations.len(), 5);
        assert_eq!(session.convergence_metrics().evidence_count, 5);

        // Consistent evidence should have concentrated belief.
        assert!(session.convergence_metrics().max_posterior > 0.9);
    }

    #[tokio::test]
    async fn test_rejected_candidate_not_admitted() {
        let model = Arc::new(ScriptedModel::new("stub"));
        // Surprising response, then a proposal that explains none of the
        // history it is validated against.
        model.push_reply("I refuse to answer this");
        model.push_reply(
            r#"{"name": "Irrelevant", "description": "d", "predicted_patterns": {"risk_assessment_binary_choice": {"zebra": 0.9}}}"#,
        );

        let mut session = session_with(Arc::clone(&model));
        let id = session.add_scenario(scenario());

        let observation = session.run_scenario(id).await.unwrap();
        assert!(observation.surprise.unwrap().is_surprising);
        assert!(observation.admitted.is_none());
        assert_eq!(session.engine().space().len(), 2);
    }

    #[tokio::test]
    async fn test_session_export_import_round_trip() {
        let model = Arc::new(ScriptedModel::new("stub"));
        model.push_reply("safe bonds");

        let mut session = session_with(Arc::clone(&model));
        let id = session.add_scenario(scenario());
        session.run_scenario(id).await.unwrap();

        let snapshot = session.export();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: SessionSnapshot = serde_json::from_str(&json).unwrap();
        let imported = ProbeSession::import(model, restored).unwrap();

        let before = session.engine().belief_state();
        let after = imported.engine().belief_state();
        assert_eq!(before.len(), after.len());
        for (hid, p) in before.iter() {
            assert!((after.probability(hid).unwrap() - p).abs() < 1e-9);
        }
        assert_eq!(
            session.convergence_metrics().evidence_count,
            imported.convergence_metrics().evidence_count
        );
        assert_eq!(session.responses().len(), imported.responses().len());
    }
}
