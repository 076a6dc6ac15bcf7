//! Multi-agent conversation orchestrator
//!
//! Drives a fixed number of turns across an ordered participant list. Each
//! step sends the current message window to one participant, takes the last
//! unit of its response as the turn's result, then inverts every message
//! role before moving on. The loop always runs `max_turns × participants`
//! steps; engine failures are recorded per step, never fatal.

use crate::agents::AgentRegistry;
use crate::engine::units::ChatUnit;
use crate::engine::{collect_units, ChatEngine, ChatInput, EngineError, Message, MessageRole};
use crate::error::AgentError;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// One logged step of a conversation: either produced content or a failure
#[derive(Debug, Clone, Serialize)]
pub struct ConversationEntry {
    pub turn: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversationEntry {
    fn message(turn: usize, content: String) -> Self {
        ConversationEntry {
            turn,
            message: Some(content),
            error: None,
        }
    }

    fn error(turn: usize, description: String) -> Self {
        ConversationEntry {
            turn,
            message: None,
            error: Some(description),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationOutcome {
    pub conversation: HashMap<Uuid, Vec<ConversationEntry>>,
    pub turns: usize,
    pub agents: Vec<Uuid>,
}

/// Run a conversation among the seed agent and the listed others, in that
/// order, for exactly `max_turns` rounds.
///
/// Every participant is resolved before the first engine call; one unknown
/// id aborts the whole run with no partial log.
pub async fn run_conversation(
    registry: &AgentRegistry,
    seed_id: Uuid,
    other_ids: &[Uuid],
    initial_message: &str,
    max_turns: usize,
) -> Result<ConversationOutcome, AgentError> {
    let mut participants: Vec<(Uuid, Arc<dyn ChatEngine>)> =
        Vec::with_capacity(other_ids.len() + 1);
    for id in std::iter::once(&seed_id).chain(other_ids) {
        let snapshot = registry.get(*id).ok_or(AgentError::NotFound(*id))?;
        participants.push((*id, snapshot.engine));
    }

    let mut conversation: HashMap<Uuid, Vec<ConversationEntry>> = participants
        .iter()
        .map(|(id, _)| (*id, Vec::new()))
        .collect();
    let mut messages = vec![Message::user(initial_message)];

    for turn in 0..max_turns {
        for (id, engine) in &participants {
            match produce_units(engine.as_ref(), messages.clone()).await {
                Ok(units) => {
                    if let Some(content) = units.last().and_then(|unit| unit.message_content()) {
                        if let Some(log) = conversation.get_mut(id) {
                            log.push(ConversationEntry::message(turn, content.clone()));
                        }
                        messages = vec![Message::assistant(content)];
                    }
                    // A step without extractable content leaves `messages`
                    // as it was; the previous message travels on.
                }
                Err(e) => {
                    log::warn!("Conversation turn {} failed for agent {}: {}", turn, id, e);
                    if let Some(log) = conversation.get_mut(id) {
                        log.push(ConversationEntry::error(turn, e.to_string()));
                    }
                }
            }
            // Roles invert after every step, successful or not, so the next
            // participant always sees the window from the other side.
            swap_roles(&mut messages);
        }
    }

    Ok(ConversationOutcome {
        conversation,
        turns: max_turns,
        agents: participants.into_iter().map(|(id, _)| id).collect(),
    })
}

async fn produce_units(
    engine: &dyn ChatEngine,
    messages: Vec<Message>,
) -> Result<Vec<ChatUnit>, EngineError> {
    let stream = engine.chat(ChatInput::Messages(messages)).await?;
    collect_units(stream).await
}

fn swap_roles(messages: &mut [Message]) {
    for message in messages {
        message.role = match message.role {
            MessageRole::User => MessageRole::Assistant,
            MessageRole::Assistant => MessageRole::User,
            MessageRole::System => MessageRole::System,
        };
    }
}
