use crate::engine::EngineError;
use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by the agent registry and orchestration layer.
///
/// The first three variants are detected before any engine call is made
/// and carry no side effects. `Engine` wraps a boundary failure from
/// engine construction; failures while consuming a chat stream are handled
/// at each call site according to its policy — converted in-band for
/// delegation, logged per-turn for conversations, surfaced for plain chat.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Agent {assistant} is not an assistant of agent {main}")]
    NotAnAssistant { main: Uuid, assistant: Uuid },

    #[error("Engine failure: {0}")]
    Engine(#[from] EngineError),
}
