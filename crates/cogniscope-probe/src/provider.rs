//! Language model provider boundary
//!
//! The engine treats text generation as a black-box collaborator: submit a
//! prompt, receive text or a failure. Provider-specific transport, retries
//! and rate limiting live behind this trait, owned by whoever implements it.
//! `ScriptedModel` is the deterministic stand-in used in tests and examples.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A completed text generation
#[derive(Debug, Clone)]
pub struct Completion {
    /// Generated text
    pub text: String,

    /// Model that produced it
    pub model: String,

    /// Wall-clock latency of the call
    pub response_time_ms: u64,
}

/// Provider trait - implemented by every text-generation backend
///
/// The contract is "submit prompt, receive text or failure", nothing
/// engine-specific. Implementations must be substitutable with a
/// deterministic stub for testing.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model name, recorded on responses
    fn name(&self) -> &str;

    /// Generate a completion for the prompt
    async fn complete(&self, prompt: &str) -> Result<Completion>;
}

/// One scripted reply in a [`ScriptedModel`] queue
#[derive(Debug, Clone)]
enum ScriptedReply {
    Text(String),
    Failure(String),
}

/// Deterministic in-memory model for tests and offline runs
///
/// Replies are served from a queue in push order; an exhausted queue falls
/// back to the configured default reply, or fails if none is set.
#[derive(Debug)]
pub struct ScriptedModel {
    name: String,
    replies: Mutex<VecDeque<ScriptedReply>>,
    default_reply: Option<String>,
}

impl ScriptedModel {
    /// Create an empty scripted model
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Mutex::new(VecDeque::new()),
            default_reply: None,
        }
    }

    /// Set the reply used when the queue is exhausted
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = Some(reply.into());
        self
    }

    /// Queue a successful reply
    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .expect("scripted reply queue poisoned")
            .push_back(ScriptedReply::Text(text.into()));
    }

    /// Queue a simulated provider failure
    pub fn push_failure(&self, reason: impl Into<String>) {
        self.replies
            .lock()
            .expect("scripted reply queue poisoned")
            .push_back(ScriptedReply::Failure(reason.into()));
    }

    /// Number of replies still queued
    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .expect("scripted reply queue poisoned")
            .len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _prompt: &str) -> Result<Completion> {
        let next = self
            .replies
            .lock()
            .expect("scripted reply queue poisoned")
            .pop_front();

        let reply = match next {
            Some(reply) => reply,
            None => match &self.default_reply {
                Some(text) => ScriptedReply::Text(text.clone()),
                None => return Err(anyhow!("scripted model exhausted: no replies queued")),
            },
        };

        match reply {
            ScriptedReply::Text(text) => Ok(Completion {
                text,
                model: self.name.clone(),
                response_time_ms: 0,
            }),
            ScriptedReply::Failure(reason) => Err(anyhow!("scripted failure: {reason}")),
        }
    }
}
