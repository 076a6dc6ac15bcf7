//! Agent registry
//!
//! Owns every live agent record and the main→assistant linkage index. Both
//! maps sit behind one mutex with identical critical-section boundaries:
//! the lock spans map access only, never engine construction or a chat
//! call, so concurrent requests against different agents are never
//! serialized behind a slow engine response.

use crate::config::Config;
use crate::engine::settings::{ASSISTANT_SYSTEM_PROMPT, DEFAULT_SYSTEM_PROMPT};
use crate::engine::{collect_text, ChatInput, EngineFactory, EngineSettings, HttpEngineFactory};
use crate::error::AgentError;
use crate::models::{AgentMetadata, AgentRecord, AgentSnapshot};
use crate::tools::CurrentTimeTool;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct RegistryInner {
    agents: HashMap<Uuid, AgentRecord>,
    /// main agent id → linked assistant ids
    assistants: HashMap<Uuid, Vec<Uuid>>,
}

pub struct AgentRegistry {
    config: Config,
    factory: Box<dyn EngineFactory>,
    inner: Mutex<RegistryInner>,
}

impl AgentRegistry {
    pub fn new(config: Config) -> Self {
        Self::with_factory(config, Box::new(HttpEngineFactory))
    }

    pub fn with_factory(config: Config, factory: Box<dyn EngineFactory>) -> Self {
        AgentRegistry {
            config,
            factory,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Create a new agent and return its id.
    ///
    /// Engine construction happens before the lock is taken; only the map
    /// insert and the linkage append run inside the critical section.
    pub fn create(
        &self,
        config: Map<String, Value>,
        is_assistant: bool,
        main_agent_id: Option<Uuid>,
    ) -> Result<Uuid, AgentError> {
        let agent_id = Uuid::new_v4();

        let mut settings = EngineSettings::baseline(&self.config);
        settings.system_prompt = self.load_system_prompt(is_assistant);
        for (key, value) in &config {
            if let Err(reason) = settings.apply_override(key, value) {
                log::warn!("Agent {}: ignoring config override: {}", agent_id, reason);
            }
        }

        let engine = self.factory.build(settings)?;
        engine.register_tool(Arc::new(CurrentTimeTool::new()));

        let now = Utc::now();
        let record = AgentRecord {
            engine,
            created_at: now,
            last_used: now,
            config,
            is_assistant,
            main_agent_id,
        };

        let mut inner = self.inner.lock();
        inner.agents.insert(agent_id, record);
        if is_assistant {
            if let Some(main_id) = main_agent_id {
                inner.assistants.entry(main_id).or_default().push(agent_id);
            }
        }
        log::info!("Created agent {} (assistant: {})", agent_id, is_assistant);
        Ok(agent_id)
    }

    /// Create an assistant linked to an existing main agent
    pub fn create_assistant_for(
        &self,
        main_id: Uuid,
        config: Map<String, Value>,
    ) -> Result<Uuid, AgentError> {
        if !self.inner.lock().agents.contains_key(&main_id) {
            return Err(AgentError::NotFound(main_id));
        }
        self.create(config, true, Some(main_id))
    }

    /// Look up an agent, touching its `last_used` timestamp
    pub fn get(&self, id: Uuid) -> Option<AgentSnapshot> {
        let mut inner = self.inner.lock();
        let record = inner.agents.get_mut(&id)?;
        record.last_used = Utc::now();
        Some(record.snapshot())
    }

    /// Metadata for every live agent; engine handles never leave the map
    pub fn list(&self) -> HashMap<Uuid, AgentMetadata> {
        let inner = self.inner.lock();
        inner
            .agents
            .iter()
            .map(|(id, record)| {
                let has_assistants = inner
                    .assistants
                    .get(id)
                    .is_some_and(|linked| !linked.is_empty());
                (*id, record.metadata(has_assistants))
            })
            .collect()
    }

    /// The linked assistants of a main agent that still resolve to live
    /// records. A missing main id is an error; a main with no assistants is
    /// an empty map.
    pub fn assistants_of(
        &self,
        main_id: Uuid,
    ) -> Result<HashMap<Uuid, AgentMetadata>, AgentError> {
        let inner = self.inner.lock();
        if !inner.agents.contains_key(&main_id) {
            return Err(AgentError::NotFound(main_id));
        }
        let linked = inner.assistants.get(&main_id).cloned().unwrap_or_default();
        Ok(linked
            .into_iter()
            .filter_map(|assistant_id| {
                let has_assistants = inner
                    .assistants
                    .get(&assistant_id)
                    .is_some_and(|nested| !nested.is_empty());
                inner
                    .agents
                    .get(&assistant_id)
                    .map(|record| (assistant_id, record.metadata(has_assistants)))
            })
            .collect())
    }

    /// Remove an agent. A main agent takes all its linked assistants with
    /// it; an assistant is unlinked from its main. Removing a missing id
    /// returns `None` with no side effects.
    pub fn remove(&self, id: Uuid) -> Option<AgentMetadata> {
        let mut inner = self.inner.lock();
        let had_assistants = inner
            .assistants
            .get(&id)
            .is_some_and(|linked| !linked.is_empty());
        let record = inner.agents.remove(&id)?;

        if let Some(assistant_ids) = inner.assistants.remove(&id) {
            for assistant_id in &assistant_ids {
                inner.agents.remove(assistant_id);
            }
            log::info!(
                "Removed agent {} and {} linked assistant(s)",
                id,
                assistant_ids.len()
            );
        } else {
            log::info!("Removed agent {}", id);
        }

        if let Some(main_id) = record.main_agent_id {
            if let Some(linked) = inner.assistants.get_mut(&main_id) {
                linked.retain(|candidate| *candidate != id);
                if linked.is_empty() {
                    inner.assistants.remove(&main_id);
                }
            }
        }

        Some(record.metadata(had_assistants))
    }

    /// Delegate a task from a main agent to one of its assistants.
    ///
    /// Validation, identity and relationship checks all run before any
    /// engine call. A failure while consuming the assistant's response
    /// stream becomes an in-band `"Error: ..."` result rather than an
    /// error to the caller.
    pub async fn delegate(
        &self,
        main_id: Uuid,
        assistant_id: Uuid,
        task: &str,
    ) -> Result<String, AgentError> {
        if task.trim().is_empty() {
            return Err(AgentError::InvalidRequest("No task provided".to_string()));
        }
        self.get(main_id).ok_or(AgentError::NotFound(main_id))?;
        let assistant = self
            .get(assistant_id)
            .ok_or(AgentError::NotFound(assistant_id))?;

        if !assistant.is_assistant || assistant.main_agent_id != Some(main_id) {
            return Err(AgentError::NotAnAssistant {
                main: main_id,
                assistant: assistant_id,
            });
        }

        let prompt = format!("Task from main agent: {}", task);
        let outcome = match assistant.engine.chat(ChatInput::Text(prompt)).await {
            Ok(stream) => collect_text(stream).await,
            Err(e) => Err(e),
        };
        Ok(match outcome {
            Ok(text) => text,
            Err(e) => format!("Error: {}", e),
        })
    }

    fn load_system_prompt(&self, is_assistant: bool) -> String {
        if is_assistant {
            return ASSISTANT_SYSTEM_PROMPT.to_string();
        }
        match fs::read_to_string(&self.config.system_instructions_path) {
            Ok(instructions) => instructions,
            Err(_) => DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}
