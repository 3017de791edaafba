use async_trait::async_trait;

use crate::errors::PilotResult;
use crate::llm::types::{CallConfig, ChatMessage, LlmResponse, ToolDef};

/// A chat-completions endpoint able to return tool calls.
/// One call is one blocking request/response round; no streaming, no retry.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDef],
        cfg: &CallConfig,
    ) -> PilotResult<LlmResponse>;
}
