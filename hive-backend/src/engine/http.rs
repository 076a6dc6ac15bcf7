//! HTTP reasoning-engine client
//!
//! Speaks the engine's wire protocol: one JSON POST carrying the full
//! settings and registered tool definitions, answered by a newline-delimited
//! stream of response units. Lines that parse as a type-tagged JSON object
//! become structured units; everything else flows through as raw fragments.

use super::units::ChatUnit;
use super::{ChatEngine, ChatInput, EngineError, EngineFactory, EngineSettings, Message, UnitStream};
use crate::http::shared_client;
use crate::tools::{Tool, ToolDefinition};
use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::StreamExt;
use parking_lot::RwLock;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub struct HttpEngine {
    client: Client,
    auth_headers: header::HeaderMap,
    settings: EngineSettings,
    tools: RwLock<Vec<Arc<dyn Tool>>>,
}

#[derive(Debug, Serialize)]
struct EngineChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    context_window: u32,
    max_tokens: u32,
    auto_run: bool,
    stream: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
    supports_vision: bool,
}

#[derive(Debug, Deserialize)]
struct EngineErrorBody {
    error: EngineErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EngineErrorDetail {
    Message { message: String },
    Text(String),
}

impl HttpEngine {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let mut auth_headers = header::HeaderMap::new();
        auth_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if !settings.api_key.is_empty() {
            let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
                .map_err(|e| EngineError::Config(format!("Invalid API key format: {}", e)))?;
            auth_headers.insert(header::AUTHORIZATION, auth_value);
        }

        Ok(Self {
            client: shared_client().clone(),
            auth_headers,
            settings,
            tools: RwLock::new(Vec::new()),
        })
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.read().iter().map(|tool| tool.definition()).collect()
    }
}

#[async_trait]
impl ChatEngine for HttpEngine {
    async fn chat(&self, input: ChatInput) -> Result<UnitStream, EngineError> {
        let messages = input.into_messages();
        let request = EngineChatRequest {
            model: &self.settings.model,
            messages: &messages,
            temperature: self.settings.temperature,
            context_window: self.settings.context_window,
            max_tokens: self.settings.max_tokens,
            auto_run: self.settings.auto_run,
            stream: true,
            system: &self.settings.system_prompt,
            tools: self.tool_definitions(),
            supports_vision: self.settings.supports_vision,
        };

        let response = self
            .client
            .post(&self.settings.endpoint)
            .headers(self.auth_headers.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                message: decode_error_body(&body),
            });
        }

        let mut bytes = response.bytes_stream();
        let stream = try_stream! {
            let mut buffer = String::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    if let Some(unit) = parse_line(&line) {
                        yield unit;
                    }
                }
            }
            // Trailing fragment without a final newline
            if let Some(unit) = parse_line(&buffer) {
                yield unit;
            }
        };
        Ok(Box::pin(stream))
    }

    fn register_tool(&self, tool: Arc<dyn Tool>) {
        self.tools.write().push(tool);
    }
}

/// Decode one wire line into a response unit; blank lines carry nothing
fn parse_line(line: &str) -> Option<ChatUnit> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(line) {
        if let Some(Value::String(kind)) = object.get("type") {
            let content = object
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Some(ChatUnit::Structured {
                kind: kind.clone(),
                content,
            });
        }
    }
    Some(ChatUnit::Raw(line.to_string()))
}

fn decode_error_body(body: &str) -> String {
    match serde_json::from_str::<EngineErrorBody>(body) {
        Ok(decoded) => match decoded.error {
            EngineErrorDetail::Message { message } => message,
            EngineErrorDetail::Text(text) => text,
        },
        Err(_) => body.to_string(),
    }
}

/// Production factory: every agent gets an [`HttpEngine`]
pub struct HttpEngineFactory;

impl EngineFactory for HttpEngineFactory {
    fn build(&self, settings: EngineSettings) -> Result<Arc<dyn ChatEngine>, EngineError> {
        Ok(Arc::new(HttpEngine::new(settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_line() {
        let unit = parse_line(r#"{"type":"message","content":"hi"}"#).unwrap();
        assert_eq!(
            unit,
            ChatUnit::Structured {
                kind: "message".to_string(),
                content: "hi".to_string()
            }
        );
    }

    #[test]
    fn test_parse_untagged_json_line_is_raw() {
        let unit = parse_line(r#"{"response":"ok"}"#).unwrap();
        assert_eq!(unit, ChatUnit::Raw(r#"{"response":"ok"}"#.to_string()));
        assert_eq!(unit.message_content().unwrap(), "ok");
    }

    #[test]
    fn test_parse_plain_text_line_is_raw() {
        assert_eq!(
            parse_line("hello\r"),
            Some(ChatUnit::Raw("hello".to_string()))
        );
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert_eq!(parse_line("   \r"), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn test_decode_error_body_variants() {
        assert_eq!(
            decode_error_body(r#"{"error":{"message":"rate limited"}}"#),
            "rate limited"
        );
        assert_eq!(decode_error_body(r#"{"error":"boom"}"#), "boom");
        assert_eq!(decode_error_body("plain failure"), "plain failure");
    }
}
