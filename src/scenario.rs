use std::path::Path;

use serde::Deserialize;

use crate::errors::{PilotError, PilotResult};
use crate::llm::tools::load_builtin_tools;
use crate::llm::types::ToolDef;

/// A file of tasks sharing one system prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    pub shared_system_prompt: String,
    pub scenarios: Vec<Scenario>,
    /// Overrides the built-in tool schema when present.
    #[serde(default)]
    pub tools: Option<Vec<ToolDef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub task_prompt: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Everything a run needs from the scenario file.
#[derive(Debug, Clone)]
pub struct SelectedScenario {
    pub number: usize,
    pub name: Option<String>,
    pub system_prompt: String,
    pub task_prompt: String,
    pub tools: Vec<ToolDef>,
}

pub fn load_scenario_file(path: &Path) -> PilotResult<ScenarioFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        PilotError::Scenario(format!("cannot read {}: {e}", path.display()))
    })?;
    let file: ScenarioFile = serde_json::from_str(&content)?;
    tracing::debug!(path = %path.display(), scenarios = file.scenarios.len(), "scenario file loaded");
    Ok(file)
}

impl ScenarioFile {
    /// Pick scenario `number`, counting from 1.
    pub fn select(&self, number: usize) -> PilotResult<SelectedScenario> {
        let scenario = number
            .checked_sub(1)
            .and_then(|i| self.scenarios.get(i))
            .ok_or_else(|| {
                PilotError::Scenario(format!(
                    "invalid scenario number {number}; file has {} scenario(s)",
                    self.scenarios.len()
                ))
            })?;

        let tools = match &self.tools {
            Some(tools) => tools.clone(),
            None => load_builtin_tools()?,
        };

        Ok(SelectedScenario {
            number,
            name: scenario.name.clone(),
            system_prompt: self.shared_system_prompt.clone(),
            task_prompt: scenario.task_prompt.clone(),
            tools,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = r#"{
        "shared_system_prompt": "You operate a desktop.",
        "scenarios": [
            { "task_prompt": "Open the calculator.", "name": "calc" },
            { "task_prompt": "Close every window." }
        ]
    }"#;

    fn write(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn selects_one_based() {
        let tmp = write(FILE);
        let file = load_scenario_file(tmp.path()).unwrap();

        let first = file.select(1).unwrap();
        assert_eq!(first.task_prompt, "Open the calculator.");
        assert_eq!(first.name.as_deref(), Some("calc"));
        assert_eq!(first.system_prompt, "You operate a desktop.");

        let second = file.select(2).unwrap();
        assert_eq!(second.task_prompt, "Close every window.");
        assert!(second.name.is_none());
    }

    #[test]
    fn zero_and_out_of_range_are_rejected() {
        let file: ScenarioFile = serde_json::from_str(FILE).unwrap();
        assert!(matches!(file.select(0), Err(PilotError::Scenario(_))));
        assert!(matches!(file.select(3), Err(PilotError::Scenario(_))));
    }

    #[test]
    fn builtin_tools_when_absent() {
        let file: ScenarioFile = serde_json::from_str(FILE).unwrap();
        let tools = file.select(1).unwrap().tools;
        assert_eq!(tools.len(), 5);
    }

    #[test]
    fn file_tools_override_builtin() {
        let file: ScenarioFile = serde_json::from_str(
            r#"{
                "shared_system_prompt": "s",
                "scenarios": [{ "task_prompt": "t" }],
                "tools": [{
                    "type": "function",
                    "function": {
                        "name": "take_screenshot",
                        "description": "Look.",
                        "parameters": { "type": "object", "properties": {} }
                    }
                }]
            }"#,
        )
        .unwrap();
        let tools = file.select(1).unwrap().tools;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "take_screenshot");
    }

    #[test]
    fn missing_file_is_scenario_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_scenario_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PilotError::Scenario(_)));
    }

    #[test]
    fn missing_prompt_is_json_error() {
        let tmp = write(r#"{ "scenarios": [] }"#);
        assert!(matches!(load_scenario_file(tmp.path()), Err(PilotError::Json(_))));
    }
}
