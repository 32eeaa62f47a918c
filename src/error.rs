use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent '{agent}' is not installed: '{command}' not found in PATH")]
    NotInstalled { agent: String, command: String },

    #[error("Agent '{agent}' requires environment variable {var} to be set")]
    MissingEnv { agent: String, var: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    #[error("Command was cancelled")]
    Cancelled,

    #[error("Command terminated by signal {0}")]
    Signal(i32),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// True for errors raised by `validate()`: the agent can be skipped or reported.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            AgentError::NotInstalled { .. } | AgentError::MissingEnv { .. }
        )
    }

    /// True when the process was stopped by a deadline or an explicit cancel.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, AgentError::Timeout { .. } | AgentError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
