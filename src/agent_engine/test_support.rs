//! In-memory stand-ins for the screen and the model, used by engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{PilotError, PilotResult};
use crate::llm::provider::LlmProvider;
use crate::llm::types::{CallConfig, ChatMessage, FunctionCall, LlmResponse, ToolCall, ToolDef};
use crate::perception::screenshot::encode_png;
use crate::provider::{ScreenProvider, Screenshot};

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenCall {
    ScreenSize,
    Capture(u32, u32),
    Move(f64, f64),
    Click,
    ScrollDown,
    Type(String),
}

/// Records every call; captures return a tiny blank PNG.
#[derive(Default)]
pub struct FakeScreen {
    calls: Mutex<Vec<ScreenCall>>,
    fail_capture: bool,
}

impl FakeScreen {
    pub fn failing_capture() -> Self {
        Self {
            fail_capture: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ScreenCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ScreenCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ScreenProvider for FakeScreen {
    async fn screen_size(&self) -> PilotResult<(u32, u32)> {
        self.record(ScreenCall::ScreenSize);
        Ok((1920, 1080))
    }

    async fn capture(&self, target_width: u32, target_height: u32) -> PilotResult<Screenshot> {
        self.record(ScreenCall::Capture(target_width, target_height));
        if self.fail_capture {
            return Err(PilotError::Capture("no monitor".into()));
        }
        let frame = image::RgbaImage::new(target_width.min(4), target_height.min(4));
        Ok(Screenshot {
            png: encode_png(frame)?,
            screen_width: 1920,
            screen_height: 1080,
        })
    }

    async fn move_mouse_normalized(&self, x: f64, y: f64) -> PilotResult<()> {
        self.record(ScreenCall::Move(x, y));
        Ok(())
    }

    async fn click(&self) -> PilotResult<()> {
        self.record(ScreenCall::Click);
        Ok(())
    }

    async fn scroll_down(&self) -> PilotResult<()> {
        self.record(ScreenCall::ScrollDown);
        Ok(())
    }

    async fn type_text(&self, text: &str) -> PilotResult<()> {
        self.record(ScreenCall::Type(text.to_string()));
        Ok(())
    }
}

/// Replays queued replies in order and keeps a copy of every request's
/// conversation. Running out of replies is an endpoint error.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<PilotResult<LlmResponse>>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<PilotResult<LlmResponse>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::default(),
        }
    }

    /// Conversations as they were sent, one per request.
    pub fn seen(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDef],
        _cfg: &CallConfig,
    ) -> PilotResult<LlmResponse> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PilotError::LlmProvider("script exhausted".into())))
    }
}

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.into(),
        call_type: "function".into(),
        function: FunctionCall {
            name: name.into(),
            arguments: arguments.into(),
        },
    }
}

pub fn reply_calls(calls: Vec<ToolCall>) -> PilotResult<LlmResponse> {
    Ok(LlmResponse {
        content: None,
        tool_calls: calls,
    })
}

pub fn reply_text(content: Option<&str>) -> PilotResult<LlmResponse> {
    Ok(LlmResponse {
        content: content.map(str::to_string),
        tool_calls: Vec::new(),
    })
}
