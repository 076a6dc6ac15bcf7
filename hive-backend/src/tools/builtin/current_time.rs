//! Current time tool
//!
//! Reports the current wall-clock time in a requested IANA timezone.
//! Registered on every new agent engine as the default capability.

use crate::tools::types::{PropertySchema, ToolDefinition, ToolInputSchema, ToolResult};
use crate::tools::Tool;
use async_trait::async_trait;
use chrono::format::{Item, StrftimeItems};
use chrono::Utc;
use chrono_tz::Tz;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tool that returns the current time in a given timezone
pub struct CurrentTimeTool {
    definition: ToolDefinition,
}

impl CurrentTimeTool {
    pub fn new() -> Self {
        let mut properties = HashMap::new();

        properties.insert(
            "timezone".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: "IANA timezone name, e.g. 'UTC' or 'America/New_York'".to_string(),
                default: Some(json!("UTC")),
                enum_values: None,
            },
        );

        properties.insert(
            "format".to_string(),
            PropertySchema {
                schema_type: "string".to_string(),
                description: format!(
                    "strftime-style output format (default: '{}')",
                    DEFAULT_FORMAT
                ),
                default: Some(json!(DEFAULT_FORMAT)),
                enum_values: None,
            },
        );

        CurrentTimeTool {
            definition: ToolDefinition {
                name: "current_time".to_string(),
                description: "Get the current time in a specified timezone.".to_string(),
                input_schema: ToolInputSchema {
                    schema_type: "object".to_string(),
                    properties,
                    required: vec![],
                },
            },
        }
    }
}

impl Default for CurrentTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct CurrentTimeParams {
    timezone: Option<String>,
    format: Option<String>,
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    async fn execute(&self, params: Value) -> ToolResult {
        let params: CurrentTimeParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return ToolResult::error(format!("Invalid parameters: {}", e)),
        };

        let tz_name = params.timezone.unwrap_or_else(|| "UTC".to_string());
        let tz: Tz = match tz_name.parse() {
            Ok(tz) => tz,
            Err(_) => return ToolResult::error(format!("Unknown timezone '{}'", tz_name)),
        };

        let format = params.format.unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        // chrono panics at display time on a malformed format string, so
        // validate the items up front.
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return ToolResult::error(format!("Invalid format string '{}'", format));
        }

        let now = Utc::now().with_timezone(&tz);
        ToolResult::success(now.format(&format).to_string()).with_metadata(json!({
            "timezone": tz_name,
        }))
    }
}
