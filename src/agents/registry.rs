//! Agent registry: maps caller-supplied ids to agent implementations.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::gemini::GeminiAgent;
use super::openai::OpenAiAgent;
use super::request::ChatRequest;
use super::traits::{Agent, ByteStream, encode_jsonl};
use crate::config::AppConfig;
use crate::error::AgentError;

/// Ids registered by [`AgentRegistry::from_config`].
pub mod ids {
    pub const OPENAI_QA: &str = "openai-qa";
    pub const OPENAI_EDITOR: &str = "openai-editor";
    pub const GOOGLE_ADK_QA: &str = "google-adk-qa";
}

type AgentFactory = Box<dyn Fn() -> Result<Arc<dyn Agent>, AgentError> + Send + Sync>;

/// A registered agent, built on first use.
struct AgentSlot {
    factory: AgentFactory,
    instance: OnceLock<Arc<dyn Agent>>,
}

/// Static id → agent mapping with lazy, memoized construction.
///
/// Construction happens at most once per id. A failed construction (for
/// example missing credentials) is not cached, so every resolve reports it.
pub struct AgentRegistry {
    slots: BTreeMap<String, AgentSlot>,
}

impl AgentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Registry with the built-in OpenAI and Gemini agents.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut registry = Self::new();
        for id in [ids::OPENAI_QA, ids::OPENAI_EDITOR] {
            let settings = config.openai.clone();
            registry.register(id, move || {
                Ok(Arc::new(OpenAiAgent::from_settings(&settings)?) as Arc<dyn Agent>)
            });
        }
        let settings = config.gemini.clone();
        registry.register(ids::GOOGLE_ADK_QA, move || {
            Ok(Arc::new(GeminiAgent::from_settings(&settings)?) as Arc<dyn Agent>)
        });
        registry
    }

    /// Register a lazily constructed agent. Replaces any previous entry.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Agent>, AgentError> + Send + Sync + 'static,
    {
        self.slots.insert(
            id.into(),
            AgentSlot {
                factory: Box::new(factory),
                instance: OnceLock::new(),
            },
        );
    }

    /// Register an already constructed agent.
    pub fn register_agent(&mut self, id: impl Into<String>, agent: Arc<dyn Agent>) {
        self.register(id, move || Ok(Arc::clone(&agent)));
    }

    /// Registered ids in sorted order.
    pub fn agent_ids(&self) -> Vec<String> {
        self.slots.keys().cloned().collect()
    }

    /// Look up (and build on first use) the agent for `agent_id`.
    pub fn resolve(&self, agent_id: &str) -> Result<Arc<dyn Agent>, AgentError> {
        let slot = self
            .slots
            .get(agent_id)
            .ok_or_else(|| AgentError::NotFound {
                agent_id: agent_id.to_string(),
                available: self.agent_ids(),
            })?;

        if let Some(agent) = slot.instance.get() {
            return Ok(Arc::clone(agent));
        }
        let agent = (slot.factory)()?;
        debug!(agent_id, backend = agent.name(), "Constructed agent");
        Ok(Arc::clone(slot.instance.get_or_init(|| agent)))
    }

    /// Resolve the request's agent and return its JSON-lines stream unmodified.
    pub async fn route(&self, request: ChatRequest) -> Result<ByteStream, AgentError> {
        let agent = self.resolve(&request.agent_id)?;
        let mode = request.mode;
        let chunks = agent.process_stream(request).await?;
        Ok(encode_jsonl(chunks, mode))
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
