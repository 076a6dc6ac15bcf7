//! Streamed response units and accumulation
//!
//! An engine response is a heterogeneous stream: structured units carrying a
//! type tag and a content fragment, interleaved with raw text fragments.
//! [`ChatUnit::message_content`] is the single extraction rule; every call
//! site — single-agent chat, delegation, each conversation turn — goes
//! through it, never through an ad-hoc reimplementation.

use super::EngineError;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;

/// A single unit of a streamed engine response
#[derive(Debug, Clone, PartialEq)]
pub enum ChatUnit {
    /// Type-tagged unit; only `message` fragments carry chat content
    Structured { kind: String, content: String },
    /// Raw text fragment, possibly a JSON-encoded `{"response": ...}` object
    Raw(String),
}

/// Lazy, finite, single-pass stream of response units
pub type UnitStream = Pin<Box<dyn Stream<Item = Result<ChatUnit, EngineError>> + Send>>;

impl ChatUnit {
    /// The chat content this unit contributes, if any.
    ///
    /// Structured units contribute their fragment only when tagged as
    /// `message`. A raw fragment that parses as a JSON object with a string
    /// `response` field contributes that field; any other raw fragment
    /// contributes itself verbatim.
    pub fn message_content(&self) -> Option<String> {
        match self {
            ChatUnit::Structured { kind, content } => {
                (kind == "message").then(|| content.clone())
            }
            ChatUnit::Raw(text) => {
                if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(text) {
                    if let Some(Value::String(response)) = object.get("response") {
                        return Some(response.clone());
                    }
                }
                Some(text.clone())
            }
        }
    }
}

/// Consume a unit stream into accumulated text: every unit's extractable
/// content concatenated in emission order, surrounding whitespace trimmed.
pub async fn collect_text(mut stream: UnitStream) -> Result<String, EngineError> {
    let mut accumulated = String::new();
    while let Some(unit) = stream.next().await {
        if let Some(fragment) = unit?.message_content() {
            accumulated.push_str(&fragment);
        }
    }
    Ok(accumulated.trim().to_string())
}

/// Consume a unit stream into the full buffered unit list. A mid-stream
/// failure discards what came before it, like the text collector.
pub async fn collect_units(mut stream: UnitStream) -> Result<Vec<ChatUnit>, EngineError> {
    let mut units = Vec::new();
    while let Some(unit) = stream.next().await {
        units.push(unit?);
    }
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn message(content: &str) -> ChatUnit {
        ChatUnit::Structured {
            kind: "message".to_string(),
            content: content.to_string(),
        }
    }

    fn unit_stream(units: Vec<ChatUnit>) -> UnitStream {
        Box::pin(stream::iter(units.into_iter().map(Ok)))
    }

    #[tokio::test]
    async fn test_mixed_units_accumulate_in_order() {
        let stream = unit_stream(vec![
            message("Hel"),
            message("lo"),
            ChatUnit::Raw(" world".to_string()),
        ]);
        assert_eq!(collect_text(stream).await.unwrap(), "Hello world");
    }

    #[tokio::test]
    async fn test_raw_json_response_field_is_unwrapped() {
        let stream = unit_stream(vec![ChatUnit::Raw(r#"{"response":"ok"}"#.to_string())]);
        assert_eq!(collect_text(stream).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_non_message_structured_units_are_skipped() {
        let stream = unit_stream(vec![
            ChatUnit::Structured {
                kind: "code".to_string(),
                content: "print('hi')".to_string(),
            },
            message("done"),
        ]);
        assert_eq!(collect_text(stream).await.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_raw_json_without_response_field_passes_verbatim() {
        let stream = unit_stream(vec![ChatUnit::Raw(r#"{"status":"thinking"}"#.to_string())]);
        assert_eq!(
            collect_text(stream).await.unwrap(),
            r#"{"status":"thinking"}"#
        );
    }

    #[tokio::test]
    async fn test_whitespace_trimmed_at_ends_only() {
        let stream = unit_stream(vec![message("  a"), message(" b ")]);
        assert_eq!(collect_text(stream).await.unwrap(), "a b");
    }

    #[tokio::test]
    async fn test_mid_stream_failure_propagates() {
        let stream: UnitStream = Box::pin(stream::iter(vec![
            Ok(message("partial")),
            Err(EngineError::Api {
                status: 500,
                message: "upstream died".to_string(),
            }),
        ]));
        assert!(collect_text(stream).await.is_err());
    }

    #[tokio::test]
    async fn test_collect_units_buffers_everything() {
        let units = vec![message("a"), ChatUnit::Raw("b".to_string())];
        let collected = collect_units(unit_stream(units.clone())).await.unwrap();
        assert_eq!(collected, units);
    }
}
