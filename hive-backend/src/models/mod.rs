pub mod agent;

pub use agent::{AgentMetadata, AgentRecord, AgentSnapshot};
