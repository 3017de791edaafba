pub mod agent_engine;
pub mod config;
pub mod errors;
pub mod executor;
pub mod llm;
pub mod perception;
pub mod provider;
pub mod scenario;

use std::sync::Arc;

use crate::agent_engine::engine::AgentEngine;
use crate::agent_engine::state::RunOutcome;
use crate::config::RunConfig;
use crate::errors::PilotResult;
use crate::executor::desktop::DesktopProvider;
use crate::llm::providers::openai_compatible::OpenAiCompatibleProvider;
use crate::scenario::SelectedScenario;

/// Install the global subscriber. `RUST_LOG` wins; otherwise `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Run one scenario against the real desktop and the configured endpoint.
pub async fn run_on_desktop(config: &RunConfig, scenario: SelectedScenario) -> PilotResult<RunOutcome> {
    let llm = Arc::new(OpenAiCompatibleProvider::from_config(&config.llm)?);
    let screen = Arc::new(DesktopProvider::new());
    tracing::info!(
        scenario = scenario.number,
        name = scenario.name.as_deref().unwrap_or("-"),
        endpoint = %config.llm.endpoint,
        tools = scenario.tools.len(),
        "starting scenario"
    );

    let mut engine = AgentEngine::new(llm, screen, scenario.tools, config);
    engine
        .run(&scenario.system_prompt, &scenario.task_prompt)
        .await
}
