use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use tracing::Instrument;

use crate::agent_engine::dispatch::{
    execute_action, ToolRequest, MULTIPLE_CALLS_REJECTED, SCREENSHOT_CAPTURED,
};
use crate::agent_engine::prune::prune_stale_screenshots;
use crate::agent_engine::state::{RunOutcome, StopReason};
use crate::config::{AgentConfig, CaptureConfig, RunConfig};
use crate::errors::PilotResult;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{CallConfig, ChatMessage, ContentPart, ToolCall, ToolDef};
use crate::perception::dump::ScreenshotDumper;
use crate::provider::ScreenProvider;

const SCREEN_CAPTION: &str = "Current screen:";

pub struct AgentEngine {
    llm: Arc<dyn LlmProvider>,
    screen: Arc<dyn ScreenProvider>,
    tools: Vec<ToolDef>,
    call_cfg: CallConfig,
    capture: CaptureConfig,
    agent: AgentConfig,
    dumper: ScreenshotDumper,

    // ── Per-run state ─────────────────────────────────────────────────────
    conv_messages: Vec<ChatMessage>,
    screenshots: Vec<PathBuf>,
}

impl AgentEngine {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        screen: Arc<dyn ScreenProvider>,
        tools: Vec<ToolDef>,
        config: &RunConfig,
    ) -> Self {
        Self {
            llm,
            screen,
            tools,
            call_cfg: CallConfig {
                model: config.llm.model.clone(),
                temperature: config.llm.temperature,
                max_tokens: config.llm.max_tokens,
            },
            capture: config.capture.clone(),
            agent: config.agent.clone(),
            dumper: ScreenshotDumper::from_config(&config.capture),
            conv_messages: Vec::new(),
            screenshots: Vec::new(),
        }
    }

    /// The conversation of the current (or last) run.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.conv_messages
    }

    /// Drive one task to an answer or to the end of the step budget.
    ///
    /// Only platform, endpoint and dump failures end the run early; everything
    /// the model gets wrong is reported back to it as a tool result.
    pub async fn run(&mut self, system_prompt: &str, task_prompt: &str) -> PilotResult<RunOutcome> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "run",
            run_id = %run_id,
            provider = %self.llm.name(),
            model = %self.call_cfg.model
        );
        self.run_inner(run_id, system_prompt, task_prompt)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &mut self,
        run_id: String,
        system_prompt: &str,
        task_prompt: &str,
    ) -> PilotResult<RunOutcome> {
        self.dumper.prepare()?;
        let (screen_w, screen_h) = self.screen.screen_size().await?;
        tracing::info!(
            screen_w,
            screen_h,
            max_steps = self.agent.max_steps,
            dump_dir = %self.dumper.dir().display(),
            dump_start = self.dumper.next_index(),
            "run started"
        );

        self.conv_messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(task_prompt),
        ];
        self.screenshots.clear();

        for step in 1..=self.agent.max_steps {
            let response = self
                .llm
                .chat(&self.conv_messages, &self.tools, &self.call_cfg)
                .await?;
            self.conv_messages.push(ChatMessage::assistant(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            let mut calls = response.tool_calls.into_iter();
            let Some(first) = calls.next() else {
                let answer = response.content.unwrap_or_default();
                tracing::info!(step, chars = answer.chars().count(), "model answered");
                return Ok(self.outcome(run_id, answer, step, StopReason::Answered));
            };

            for extra in calls {
                tracing::warn!(step, tool = %extra.function.name, id = %extra.id, "extra tool call rejected");
                self.conv_messages
                    .push(ChatMessage::tool_result(&extra, MULTIPLE_CALLS_REJECTED));
            }

            self.handle_tool_call(step, &first).await?;
            tokio::time::sleep(self.agent.step_delay()).await;
        }

        tracing::warn!(max_steps = self.agent.max_steps, "step budget exhausted");
        Ok(self.outcome(
            run_id,
            String::new(),
            self.agent.max_steps,
            StopReason::StepBudgetExhausted,
        ))
    }

    async fn handle_tool_call(&mut self, step: u32, call: &ToolCall) -> PilotResult<()> {
        tracing::info!(step, tool = %call.function.name, args = %call.function.arguments, "tool call");

        let action = match ToolRequest::parse(call) {
            Ok(ToolRequest::TakeScreenshot) => return self.observe(call).await,
            Ok(ToolRequest::Act(action)) => action,
            Err(e) => {
                tracing::warn!(step, error = %e, "tool arguments rejected");
                self.conv_messages
                    .push(ChatMessage::tool_result(call, e.to_tool_content()));
                return Ok(());
            }
        };

        let content =
            execute_action(&action, self.screen.as_ref(), self.agent.settle_delay()).await?;
        tracing::debug!(step, result = %content, "tool result");
        self.conv_messages
            .push(ChatMessage::tool_result(call, content));
        Ok(())
    }

    /// Capture, persist, and hand the image to the model as a user turn.
    async fn observe(&mut self, call: &ToolCall) -> PilotResult<()> {
        let shot = self
            .screen
            .capture(self.capture.target_width, self.capture.target_height)
            .await?;
        let path = self.dumper.write(&shot.png)?;
        tracing::info!(
            path = %path.display(),
            bytes = shot.png.len(),
            screen_w = shot.screen_width,
            screen_h = shot.screen_height,
            "screenshot captured"
        );
        self.screenshots.push(path);

        let b64 = base64::engine::general_purpose::STANDARD.encode(&shot.png);
        self.conv_messages
            .push(ChatMessage::tool_result(call, SCREENSHOT_CAPTURED));
        self.conv_messages.push(ChatMessage::user_parts(vec![
            ContentPart::text(SCREEN_CAPTION),
            ContentPart::png_base64(&b64),
        ]));

        let removed = prune_stale_screenshots(&mut self.conv_messages);
        if removed > 0 {
            tracing::debug!(removed, remaining = self.conv_messages.len(), "pruned stale screenshots");
        }
        Ok(())
    }

    fn outcome(&mut self, run_id: String, answer: String, steps: u32, stop: StopReason) -> RunOutcome {
        RunOutcome {
            run_id,
            answer,
            steps,
            stop,
            screenshots: std::mem::take(&mut self.screenshots),
        }
    }
}
