use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::errors::PilotResult;
use crate::llm::tools::{CLICK_MOUSE, MOVE_MOUSE, SCROLL_DOWN, TAKE_SCREENSHOT, TYPE_TEXT};
use crate::llm::types::ToolCall;
use crate::provider::{ScreenProvider, NORM_MAX};

pub const UNKNOWN_TOOL: &str = "error: unknown_tool";
pub const MULTIPLE_CALLS_REJECTED: &str = "error: only one tool call per response allowed";
pub const SCREENSHOT_CAPTURED: &str = "Screenshot captured.";

/// A tool invocation the model can fix by retrying with better arguments.
/// Rendered into the tool result, never propagated out of the loop.
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("malformed arguments for {tool}: {source}")]
    Malformed {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("arguments for {tool} must be a JSON object")]
    NotAnObject { tool: &'static str },

    #[error("invalid arguments for {tool}: {source}")]
    Invalid {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ArgumentError {
    /// Tool-result text shown to the model.
    pub fn to_tool_content(&self) -> String {
        format!("error: {self}")
    }
}

/// A validated tool invocation. Screenshots are observations handled by the
/// engine; everything else is an [`Action`] run through [`execute_action`].
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    TakeScreenshot,
    Act(Action),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    MoveMouse { x: f64, y: f64 },
    ClickMouse,
    TypeText { text: String },
    ScrollDown,
    Unknown { name: String },
}

#[derive(Deserialize)]
struct MoveMouseArgs {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct TypeTextArgs {
    text: String,
}

/// Decode the raw argument string as a JSON object of shape `T`.
fn parse_args<T: DeserializeOwned>(tool: &'static str, raw: &str) -> Result<T, ArgumentError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| ArgumentError::Malformed { tool, source })?;
    if !value.is_object() {
        return Err(ArgumentError::NotAnObject { tool });
    }
    serde_json::from_value(value).map_err(|source| ArgumentError::Invalid { tool, source })
}

impl ToolRequest {
    /// Only tools that take parameters look at the argument payload.
    pub fn parse(call: &ToolCall) -> Result<Self, ArgumentError> {
        let raw = call.function.arguments.as_str();
        let action = match call.function.name.as_str() {
            TAKE_SCREENSHOT => return Ok(Self::TakeScreenshot),
            MOVE_MOUSE => {
                let args: MoveMouseArgs = parse_args(MOVE_MOUSE, raw)?;
                Action::MoveMouse {
                    x: args.x,
                    y: args.y,
                }
            }
            CLICK_MOUSE => Action::ClickMouse,
            TYPE_TEXT => {
                let args: TypeTextArgs = parse_args(TYPE_TEXT, raw)?;
                Action::TypeText { text: args.text }
            }
            SCROLL_DOWN => Action::ScrollDown,
            other => Action::Unknown {
                name: other.to_string(),
            },
        };
        Ok(Self::Act(action))
    }
}

/// Clamp one normalized coordinate into `[0, NORM_MAX]`.
pub fn clamp_norm(v: f64) -> f64 {
    v.clamp(0.0, NORM_MAX)
}

/// Run an action against the provider, wait `settle` for the UI, and return
/// the tool-result text. Provider failures are fatal and propagate.
pub async fn execute_action(
    action: &Action,
    screen: &dyn ScreenProvider,
    settle: std::time::Duration,
) -> PilotResult<String> {
    let content = match action {
        Action::MoveMouse { x, y } => {
            let (x, y) = (clamp_norm(*x), clamp_norm(*y));
            screen.move_mouse_normalized(x, y).await?;
            tokio::time::sleep(settle).await;
            // Halves round to even, matching the pixel mapping.
            format!(
                "Cursor moved to ({}, {}).",
                x.round_ties_even() as i64,
                y.round_ties_even() as i64
            )
        }
        Action::ClickMouse => {
            screen.click().await?;
            tokio::time::sleep(settle).await;
            "Mouse clicked.".to_string()
        }
        Action::TypeText { text } => {
            screen.type_text(text).await?;
            tokio::time::sleep(settle).await;
            format!("Typed: {text}")
        }
        Action::ScrollDown => {
            screen.scroll_down().await?;
            tokio::time::sleep(settle).await;
            "Scrolled down.".to_string()
        }
        Action::Unknown { name } => {
            tracing::warn!(tool = %name, "model requested an unknown tool");
            UNKNOWN_TOOL.to_string()
        }
    };
    Ok(content)
}
