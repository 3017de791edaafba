use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a run. Anything the model can recover from is
/// reported back to it as a tool result instead (see `agent_engine::dispatch`).
#[derive(Debug, Error)]
pub enum PilotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("LLM endpoint error: {0}")]
    LlmProvider(String),

    #[error("LLM request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("Screen capture error: {0}")]
    Capture(String),

    #[error("Input injection error: {0}")]
    Input(String),

    #[error("Failed to write screenshot {}: {source}", path.display())]
    Dump {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type PilotResult<T> = Result<T, PilotError>;
