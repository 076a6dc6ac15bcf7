use crate::engine::ChatEngine;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Registry-internal agent record. Holds the live engine handle; never
/// serialized or handed to the transport layer directly.
pub struct AgentRecord {
    pub engine: Arc<dyn ChatEngine>,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    /// Creation-time overrides, stored verbatim for introspection
    pub config: Map<String, Value>,
    pub is_assistant: bool,
    pub main_agent_id: Option<Uuid>,
}

impl AgentRecord {
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            engine: Arc::clone(&self.engine),
            created_at: self.created_at,
            last_used: self.last_used,
            config: self.config.clone(),
            is_assistant: self.is_assistant,
            main_agent_id: self.main_agent_id,
        }
    }

    pub fn metadata(&self, has_assistants: bool) -> AgentMetadata {
        AgentMetadata {
            created_at: self.created_at,
            last_used: self.last_used,
            config: self.config.clone(),
            is_assistant: self.is_assistant,
            main_agent_id: self.main_agent_id,
            has_assistants,
        }
    }
}

/// What a registry lookup returns: the engine handle plus a copy of the
/// metadata taken while the lock was held.
#[derive(Clone)]
pub struct AgentSnapshot {
    pub engine: Arc<dyn ChatEngine>,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub config: Map<String, Value>,
    pub is_assistant: bool,
    pub main_agent_id: Option<Uuid>,
}

/// Wire-safe agent listing entry; excludes the engine handle
#[derive(Debug, Clone, Serialize)]
pub struct AgentMetadata {
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub config: Map<String, Value>,
    pub is_assistant: bool,
    pub main_agent_id: Option<Uuid>,
    pub has_assistants: bool,
}
