pub mod builtin;
pub mod types;

pub use builtin::CurrentTimeTool;
pub use types::{PropertySchema, ToolDefinition, ToolInputSchema, ToolResult};

use async_trait::async_trait;
use serde_json::Value;

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool definition for the engine API
    fn definition(&self) -> ToolDefinition;

    /// Executes the tool with the given parameters
    async fn execute(&self, params: Value) -> ToolResult;

    /// Returns the tool's name
    fn name(&self) -> String {
        self.definition().name.clone()
    }
}
