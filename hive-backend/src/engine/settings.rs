use crate::config::Config;
use serde_json::Value;

/// Default system prompt for main agents when no instructions file exists
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. You can use your registered tools to extend your capabilities.";

/// System prompt applied to assistant agents, overriding any instructions file
pub const ASSISTANT_SYSTEM_PROMPT: &str =
    "You are an assistant agent whose purpose is to help the main agent with planning and executing small tasks. Be concise and helpful.";

/// Construction-time parameters of one engine instance.
///
/// Creation-time config entries are applied through [`apply_override`]
/// against this explicit whitelist; arbitrary attribute injection is not
/// supported.
///
/// [`apply_override`]: EngineSettings::apply_override
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub model: String,
    pub endpoint: String,
    pub api_key: String,
    pub temperature: f32,
    pub context_window: u32,
    pub max_tokens: u32,
    pub auto_run: bool,
    pub system_prompt: String,
    pub supports_vision: bool,
}

impl EngineSettings {
    /// Fixed baseline every agent starts from
    pub fn baseline(config: &Config) -> Self {
        EngineSettings {
            model: config.engine_model.clone(),
            endpoint: config.engine_endpoint.clone(),
            api_key: config.engine_api_key.clone(),
            temperature: 0.05,
            context_window: 128_000,
            max_tokens: 4096,
            auto_run: true,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            supports_vision: false,
        }
    }

    /// Apply one creation-time override. Last write wins.
    ///
    /// Returns a description of the problem when the key is not a settable
    /// parameter or the value has the wrong shape; the caller decides
    /// whether to log or reject.
    pub fn apply_override(&mut self, key: &str, value: &Value) -> Result<(), String> {
        match key {
            "model" => self.model = expect_str(key, value)?,
            "endpoint" => self.endpoint = expect_str(key, value)?,
            "system_prompt" => self.system_prompt = expect_str(key, value)?,
            "temperature" => {
                self.temperature = value
                    .as_f64()
                    .ok_or_else(|| format!("'{}' expects a number", key))?
                    as f32
            }
            "context_window" => self.context_window = expect_u32(key, value)?,
            "max_tokens" => self.max_tokens = expect_u32(key, value)?,
            "auto_run" => self.auto_run = expect_bool(key, value)?,
            "supports_vision" => self.supports_vision = expect_bool(key, value)?,
            _ => return Err(format!("'{}' is not a settable engine parameter", key)),
        }
        Ok(())
    }
}

fn expect_str(key: &str, value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("'{}' expects a string", key))
}

fn expect_u32(key: &str, value: &Value) -> Result<u32, String> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| format!("'{}' expects an unsigned integer", key))
}

fn expect_bool(key: &str, value: &Value) -> Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| format!("'{}' expects a boolean", key))
}
