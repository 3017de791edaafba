use crate::errors::{PilotError, PilotResult};
use crate::llm::types::ToolDef;

pub const TAKE_SCREENSHOT: &str = "take_screenshot";
pub const MOVE_MOUSE: &str = "move_mouse";
pub const CLICK_MOUSE: &str = "click_mouse";
pub const TYPE_TEXT: &str = "type_text";
pub const SCROLL_DOWN: &str = "scroll_down";

/// Loads built-in tool definitions from the prompts/tools/builtin.json file.
/// The JSON is embedded at compile time via include_str!.
pub fn load_builtin_tools() -> PilotResult<Vec<ToolDef>> {
    let json = include_str!("../../prompts/tools/builtin.json");
    serde_json::from_str(json)
        .map_err(|e| PilotError::Config(format!("Failed to parse builtin tools: {e}")))
}
