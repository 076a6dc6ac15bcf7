use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub engine_endpoint: String,
    pub engine_api_key: String,
    pub engine_model: String,
    pub system_instructions_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            engine_endpoint: env::var("ENGINE_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8000/api/chat".to_string()),
            engine_api_key: env::var("ENGINE_API_KEY").unwrap_or_default(),
            engine_model: env::var("ENGINE_MODEL")
                .unwrap_or_else(|_| "openai/hive-core".to_string()),
            system_instructions_path: env::var("SYSTEM_INSTRUCTIONS_PATH")
                .unwrap_or_else(|_| "./system_instructions.md".to_string()),
        }
    }
}
