//! Reasoning-engine boundary
//!
//! Agents wrap an engine instance behind the [`ChatEngine`] trait: a
//! capability-registration call plus a streaming chat call. The engine's
//! heterogeneous response stream is normalized by [`units`] into plain
//! accumulated text; [`http::HttpEngine`] is the production implementation.

pub mod http;
pub mod settings;
pub mod units;

pub use http::{HttpEngine, HttpEngineFactory};
pub use settings::EngineSettings;
pub use units::{collect_text, collect_units, ChatUnit, UnitStream};

use crate::tools::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Input to a chat exchange: a bare prompt or an ordered message list
#[derive(Debug, Clone)]
pub enum ChatInput {
    Text(String),
    Messages(Vec<Message>),
}

impl ChatInput {
    /// Normalize to the message-list form sent over the wire
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            ChatInput::Text(prompt) => vec![Message::user(prompt)],
            ChatInput::Messages(messages) => messages,
        }
    }
}

/// Failures raised at the engine boundary
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Engine returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid engine configuration: {0}")]
    Config(String),
}

/// A reasoning-engine instance owned by one agent.
///
/// `chat` opens a lazy, finite, single-pass unit stream; consume it with
/// [`collect_text`] or [`collect_units`]. The stream is unbounded: no
/// timeout, no cancellation, the full response is buffered before any
/// caller-visible result. Concurrent `chat` calls on one engine are
/// permitted and not serialized.
#[async_trait]
pub trait ChatEngine: Send + Sync {
    async fn chat(&self, input: ChatInput) -> Result<UnitStream, EngineError>;

    /// Register a capability on this engine instance
    fn register_tool(&self, tool: Arc<dyn Tool>);
}

/// Builds engine instances from settings; the seam that lets tests swap in
/// a scripted engine.
pub trait EngineFactory: Send + Sync {
    fn build(&self, settings: EngineSettings) -> Result<Arc<dyn ChatEngine>, EngineError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use futures_util::stream;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// One scripted outcome for a `chat` call
    pub enum ScriptedReply {
        Units(Vec<ChatUnit>),
        Failure(String),
    }

    /// Engine that replays scripted replies and records every input it saw.
    /// Once the script runs dry it keeps answering with an empty stream.
    pub struct ScriptedEngine {
        replies: Mutex<VecDeque<ScriptedReply>>,
        pub inputs: Mutex<Vec<Vec<Message>>>,
        pub tools: Mutex<Vec<Arc<dyn Tool>>>,
    }

    impl ScriptedEngine {
        pub fn new(replies: Vec<ScriptedReply>) -> Arc<Self> {
            Arc::new(ScriptedEngine {
                replies: Mutex::new(replies.into()),
                inputs: Mutex::new(Vec::new()),
                tools: Mutex::new(Vec::new()),
            })
        }

        pub fn empty() -> Arc<Self> {
            Self::new(Vec::new())
        }

        /// Engine that answers every call with a single message unit
        pub fn always_saying(text: &str) -> Arc<Self> {
            let unit = ChatUnit::Structured {
                kind: "message".to_string(),
                content: text.to_string(),
            };
            Arc::new(ScriptedEngine {
                replies: Mutex::new(
                    std::iter::repeat_with(|| ScriptedReply::Units(vec![unit.clone()]))
                        .take(64)
                        .collect(),
                ),
                inputs: Mutex::new(Vec::new()),
                tools: Mutex::new(Vec::new()),
            })
        }

        pub fn call_count(&self) -> usize {
            self.inputs.lock().len()
        }
    }

    #[async_trait]
    impl ChatEngine for ScriptedEngine {
        async fn chat(&self, input: ChatInput) -> Result<UnitStream, EngineError> {
            self.inputs.lock().push(input.into_messages());
            let units = match self.replies.lock().pop_front() {
                Some(ScriptedReply::Units(units)) => units,
                Some(ScriptedReply::Failure(message)) => {
                    return Err(EngineError::Api {
                        status: 500,
                        message,
                    });
                }
                None => Vec::new(),
            };
            Ok(Box::pin(stream::iter(
                units.into_iter().map(Ok::<_, EngineError>),
            )))
        }

        fn register_tool(&self, tool: Arc<dyn Tool>) {
            self.tools.lock().push(tool);
        }
    }

    /// Factory that hands out pre-built scripted engines in creation order
    /// and keeps the settings each build call received. The capture list is
    /// shared so tests can inspect it after the factory moves into a
    /// registry.
    pub struct ScriptedFactory {
        engines: Mutex<VecDeque<Arc<ScriptedEngine>>>,
        built_with: Arc<Mutex<Vec<EngineSettings>>>,
    }

    impl ScriptedFactory {
        pub fn new(engines: Vec<Arc<ScriptedEngine>>) -> Self {
            ScriptedFactory {
                engines: Mutex::new(engines.into()),
                built_with: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn captures(&self) -> Arc<Mutex<Vec<EngineSettings>>> {
            Arc::clone(&self.built_with)
        }
    }

    impl EngineFactory for ScriptedFactory {
        fn build(&self, settings: EngineSettings) -> Result<Arc<dyn ChatEngine>, EngineError> {
            self.built_with.lock().push(settings);
            let engine = self
                .engines
                .lock()
                .pop_front()
                .unwrap_or_else(ScriptedEngine::empty);
            Ok(engine)
        }
    }
}
