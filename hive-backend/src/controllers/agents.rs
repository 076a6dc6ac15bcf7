use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AgentError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    /// Engine parameter overrides applied at creation time
    #[serde(default)]
    pub config: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct DelegateRequest {
    pub task: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/agents")
            .route(web::post().to(create_agent))
            .route(web::get().to(list_agents)),
    )
    .service(web::resource("/api/agents/{id}").route(web::delete().to(remove_agent)))
    .service(
        web::resource("/api/agents/{id}/assistants")
            .route(web::post().to(create_assistant))
            .route(web::get().to(list_assistants)),
    )
    .service(
        web::resource("/api/agents/{id}/delegate/{assistant_id}")
            .route(web::post().to(delegate_task)),
    );
}

/// Create a new main agent
async fn create_agent(
    state: web::Data<AppState>,
    body: web::Json<CreateAgentRequest>,
) -> impl Responder {
    match state.registry.create(body.into_inner().config, false, None) {
        Ok(agent_id) => HttpResponse::Ok().json(serde_json::json!({
            "agent_id": agent_id,
            "status": "created"
        })),
        Err(e) => {
            log::error!("Failed to create agent: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// List all active agents (metadata only, engine handles never leave the core)
async fn list_agents(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.registry.list())
}

/// Remove an agent; a main agent takes its assistants with it
async fn remove_agent(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let agent_id = path.into_inner();
    match state.registry.remove(agent_id) {
        Some(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "removed",
            "agent_id": agent_id
        })),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Agent not found"
        })),
    }
}

/// Create an assistant agent linked to a main agent
async fn create_assistant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CreateAgentRequest>,
) -> impl Responder {
    let main_id = path.into_inner();
    match state
        .registry
        .create_assistant_for(main_id, body.into_inner().config)
    {
        Ok(assistant_id) => HttpResponse::Ok().json(serde_json::json!({
            "assistant_id": assistant_id,
            "main_agent_id": main_id,
            "status": "created"
        })),
        Err(AgentError::NotFound(_)) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Main agent not found"
        })),
        Err(e) => {
            log::error!("Failed to create assistant for {}: {}", main_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// List the live assistants of a main agent
async fn list_assistants(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let main_id = path.into_inner();
    match state.registry.assistants_of(main_id) {
        Ok(assistants) => HttpResponse::Ok().json(serde_json::json!({
            "main_agent_id": main_id,
            "assistants": assistants
        })),
        Err(AgentError::NotFound(_)) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Main agent not found"
        })),
        Err(e) => {
            log::error!("Failed to list assistants of {}: {}", main_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}

/// Delegate a task from a main agent to one of its assistants
async fn delegate_task(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<DelegateRequest>,
) -> impl Responder {
    let (main_id, assistant_id) = path.into_inner();
    let task = body.into_inner().task.unwrap_or_default();

    match state.registry.delegate(main_id, assistant_id, &task).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "main_agent_id": main_id,
            "assistant_id": assistant_id,
            "result": result
        })),
        Err(e @ AgentError::InvalidRequest(_)) => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
        Err(AgentError::NotFound(id)) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Agent {} not found", id)
        })),
        Err(AgentError::NotAnAssistant { .. }) => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Target is not a registered assistant of this agent"
            }))
        }
        Err(e) => {
            log::error!("Delegation {} -> {} failed: {}", main_id, assistant_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}
