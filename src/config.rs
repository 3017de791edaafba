use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{PilotError, PilotResult};

const CONFIG_FILE: &str = "config.toml";

/// Environment variable that overrides `llm.api_key`.
pub const API_KEY_ENV: &str = "DESKPILOT_API_KEY";

/// Immutable configuration for one run. Every field has a default so a
/// partial (or absent) `config.toml` is always usable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Full chat-completions URL, e.g. `http://localhost:1234/v1/chat/completions`.
    pub endpoint: String,
    pub model: String,
    /// Sent as a bearer token when non-empty. Local servers usually need none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234/v1/chat/completions".into(),
            model: "qwen/qwen3-vl-2b-instruct".into(),
            api_key: None,
            timeout_secs: 240,
            temperature: 0.2,
            max_tokens: 2048,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub target_width: u32,
    pub target_height: u32,
    pub dump_dir: PathBuf,
    pub dump_prefix: String,
    pub dump_start: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_width: 1344,
            target_height: 756,
            dump_dir: PathBuf::from("dumps"),
            dump_prefix: "screen_".into(),
            dump_start: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_steps: u32,
    /// Pause after every step, before the next model request.
    pub step_delay_ms: u64,
    /// Pause after each pointer/keyboard action so the UI can settle.
    pub settle_delay_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 50,
            step_delay_ms: 400,
            settle_delay_ms: 60,
        }
    }
}

impl AgentConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Look for `config.toml` next to the executable, then in the working
/// directory, then in the platform config dir (`<config>/deskpilot/`).
fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(CONFIG_FILE);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    let candidate = dirs::config_dir()?.join("deskpilot").join(CONFIG_FILE);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in user config dir");
        return Some(candidate);
    }
    None
}

/// Parse a config document. Missing sections and fields take their defaults.
pub fn parse_config(content: &str) -> PilotResult<RunConfig> {
    let config: RunConfig = toml::from_str(content)?;
    if config.capture.target_width == 0 || config.capture.target_height == 0 {
        return Err(PilotError::Config(
            "capture.target_width and capture.target_height must be non-zero".into(),
        ));
    }
    Ok(config)
}

/// Load the run configuration. An explicit path must exist; otherwise the
/// usual locations are searched and built-in defaults are used if none match.
pub fn load_config(explicit: Option<&Path>) -> PilotResult<RunConfig> {
    let path = match explicit {
        Some(p) => {
            if !p.exists() {
                return Err(PilotError::Config(format!(
                    "config file {} does not exist",
                    p.display()
                )));
            }
            Some(p.to_path_buf())
        }
        None => resolve_config_path(),
    };

    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            let config = parse_config(&content)?;
            tracing::info!(path = %path.display(), model = %config.llm.model, "config loaded");
            config
        }
        None => {
            tracing::info!("no config.toml found; using built-in defaults");
            RunConfig::default()
        }
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            config.llm.api_key = Some(key);
        }
    }
    Ok(config)
}

pub fn save_config(config: &RunConfig, path: &Path) -> PilotResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.llm.timeout(), Duration::from_secs(240));
        assert_eq!(config.agent.settle_delay(), Duration::from_millis(60));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = parse_config(
            r#"
            [llm]
            model = "local-vl"
            temperature = 0.5

            [agent]
            max_steps = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.model, "local-vl");
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.agent.max_steps, 3);
        assert_eq!(config.agent.step_delay_ms, 400);
        assert_eq!(config.capture.dump_prefix, "screen_");
    }

    #[test]
    fn zero_capture_size_is_rejected() {
        let err = parse_config("[capture]\ntarget_width = 0\n").unwrap_err();
        assert!(matches!(err, PilotError::Config(_)));
    }

    #[test]
    fn saved_config_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = RunConfig::default();
        config.capture.dump_start = 7;
        save_config(&config, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_config(&content).unwrap(), config);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, PilotError::Config(_)));
    }
}
