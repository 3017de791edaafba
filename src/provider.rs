use async_trait::async_trait;

use crate::errors::PilotResult;

/// Upper bound of the normalized coordinate space on both axes.
pub const NORM_MAX: f64 = 1000.0;

/// A capture scaled to the requested size, PNG-encoded.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub png: Vec<u8>,
    /// True (unscaled) screen size at capture time.
    pub screen_width: u32,
    pub screen_height: u32,
}

/// Capture and actuation primitives the agent loop drives.
///
/// Every call completes the platform operation before returning. Failures
/// here are platform failures and abort the run; they are never confused
/// with bad tool arguments, which the loop validates before calling in.
#[async_trait]
pub trait ScreenProvider: Send + Sync {
    /// Current screen size in physical pixels.
    async fn screen_size(&self) -> PilotResult<(u32, u32)>;

    /// Capture the screen scaled to `target_width`×`target_height`, with the
    /// mouse cursor drawn in when it is on screen.
    async fn capture(&self, target_width: u32, target_height: u32) -> PilotResult<Screenshot>;

    /// Move the pointer to (`x`, `y`) in normalized `[0, NORM_MAX]` space.
    async fn move_mouse_normalized(&self, x: f64, y: f64) -> PilotResult<()>;

    /// Primary-button click at the current pointer position.
    async fn click(&self) -> PilotResult<()>;

    /// Scroll down by one wheel notch.
    async fn scroll_down(&self) -> PilotResult<()>;

    /// Type `text` character by character, in order.
    async fn type_text(&self, text: &str) -> PilotResult<()>;
}
