use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use uuid::Uuid;

use crate::agents::run_conversation;
use crate::engine::{collect_text, ChatInput, Message};
use crate::error::AgentError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationRequest {
    #[serde(default)]
    pub other_agent_ids: Vec<Uuid>,
    #[serde(default = "default_initial_message")]
    pub initial_message: String,
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_initial_message() -> String {
    "Hello!".to_string()
}

fn default_max_turns() -> usize {
    5
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/agents/{id}/chat").route(web::post().to(chat_with_agent)))
        .service(
            web::resource("/api/agents/{id}/conversation")
                .route(web::post().to(multi_agent_chat)),
        );
}

/// Chat with a single agent: send a prompt or a message list, get back the
/// accumulated response text
async fn chat_with_agent(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ChatRequest>,
) -> impl Responder {
    let agent_id = path.into_inner();
    let body = body.into_inner();

    let input = if let Some(prompt) = body.prompt.filter(|p| !p.trim().is_empty()) {
        ChatInput::Text(prompt)
    } else if !body.messages.is_empty() {
        ChatInput::Messages(body.messages)
    } else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "No prompt or messages provided"
        }));
    };

    let agent = match state.registry.get(agent_id) {
        Some(agent) => agent,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Agent not found"
            }));
        }
    };

    let outcome = match agent.engine.chat(input).await {
        Ok(stream) => collect_text(stream).await,
        Err(e) => Err(e),
    };
    match outcome {
        Ok(response) => HttpResponse::Ok().json(serde_json::json!({
            "response": response,
            "agent_id": agent_id
        })),
        Err(e) => {
            log::error!("Chat with agent {} failed: {}", agent_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// Run a fixed-length conversation between this agent and the listed others
async fn multi_agent_chat(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ConversationRequest>,
) -> impl Responder {
    let seed_id = path.into_inner();
    let body = body.into_inner();

    match run_conversation(
        &state.registry,
        seed_id,
        &body.other_agent_ids,
        &body.initial_message,
        body.max_turns,
    )
    .await
    {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(AgentError::NotFound(id)) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Agent {} not found", id)
        })),
        Err(e) => {
            log::error!("Conversation seeded by {} failed: {}", seed_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}
