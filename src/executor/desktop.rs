use async_trait::async_trait;

use crate::errors::{PilotError, PilotResult};
use crate::executor::{dpi, input};
use crate::perception::screenshot::{capture_primary_frame, scale_and_encode};
use crate::provider::{ScreenProvider, Screenshot};

/// The real desktop: xcap for capture, enigo for input.
///
/// Construction performs the one-time process setup (DPI awareness), so the
/// agent loop never depends on ambient platform state.
pub struct DesktopProvider {
    _private: (),
}

impl DesktopProvider {
    pub fn new() -> Self {
        dpi::init_dpi_awareness();
        Self { _private: () }
    }
}

impl Default for DesktopProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Run blocking platform work off the async executor and wait for it.
async fn blocking<T, F>(what: &'static str, f: F) -> PilotResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> PilotResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PilotError::Input(format!("{what}: join: {e}")))?
}

#[async_trait]
impl ScreenProvider for DesktopProvider {
    async fn screen_size(&self) -> PilotResult<(u32, u32)> {
        blocking("screen_size", input::screen_size).await
    }

    async fn capture(&self, target_width: u32, target_height: u32) -> PilotResult<Screenshot> {
        blocking("capture", move || {
            let frame = capture_primary_frame()?;
            // A missing cursor position only costs the overlay, not the capture.
            let cursor = match input::cursor_location() {
                Ok(pos) => Some(pos),
                Err(e) => {
                    tracing::warn!(error = %e, "cursor position unavailable; capturing without it");
                    None
                }
            };
            scale_and_encode(frame, target_width, target_height, cursor)
        })
        .await
    }

    async fn move_mouse_normalized(&self, x: f64, y: f64) -> PilotResult<()> {
        blocking("move_mouse", move || input::move_normalized(x, y).map(|_| ())).await
    }

    async fn click(&self) -> PilotResult<()> {
        blocking("click", input::click).await
    }

    async fn scroll_down(&self) -> PilotResult<()> {
        blocking("scroll_down", input::scroll_down).await
    }

    async fn type_text(&self, text: &str) -> PilotResult<()> {
        let text = text.to_string();
        blocking("type_text", move || input::type_text(&text)).await
    }
}
