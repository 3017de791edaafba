// Pointer and keyboard injection through enigo. All functions block.
use enigo::{Axis, Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use crate::errors::{PilotError, PilotResult};
use crate::provider::NORM_MAX;

/// Used when the platform reports a non-positive display size.
const FALLBACK_SCREEN: (u32, u32) = (1920, 1080);

fn connect() -> PilotResult<Enigo> {
    Enigo::new(&Settings::default())
        .map_err(|e| PilotError::Input(format!("failed to init enigo: {e}")))
}

pub fn screen_size() -> PilotResult<(u32, u32)> {
    display_size(&connect()?)
}

fn display_size(enigo: &Enigo) -> PilotResult<(u32, u32)> {
    let (w, h) = enigo
        .main_display()
        .map_err(|e| PilotError::Input(format!("query display size: {e}")))?;
    Ok(sanitize_screen_size(w, h))
}

fn sanitize_screen_size(w: i32, h: i32) -> (u32, u32) {
    (
        if w > 0 { w as u32 } else { FALLBACK_SCREEN.0 },
        if h > 0 { h as u32 } else { FALLBACK_SCREEN.1 },
    )
}

pub fn cursor_location() -> PilotResult<(i32, i32)> {
    let enigo = connect()?;
    enigo
        .location()
        .map_err(|e| PilotError::Input(format!("query cursor position: {e}")))
}

/// Normalized `[0, NORM_MAX]` coordinates to physical pixels on a
/// `screen_w`×`screen_h` screen. 0 maps to the first pixel, NORM_MAX to the last.
pub fn norm_to_pixels(xn: f64, yn: f64, screen_w: u32, screen_h: u32) -> (i32, i32) {
    let x = (xn / NORM_MAX * (screen_w.saturating_sub(1)) as f64).round_ties_even() as i32;
    let y = (yn / NORM_MAX * (screen_h.saturating_sub(1)) as f64).round_ties_even() as i32;
    (x, y)
}

pub fn move_normalized(xn: f64, yn: f64) -> PilotResult<(i32, i32)> {
    let mut enigo = connect()?;
    let (w, h) = display_size(&enigo)?;
    let (x, y) = norm_to_pixels(xn, yn, w, h);
    enigo
        .move_mouse(x, y, Coordinate::Abs)
        .map_err(|e| PilotError::Input(format!("move mouse: {e}")))?;
    tracing::debug!(xn, yn, x, y, "pointer moved");
    Ok((x, y))
}

pub fn click() -> PilotResult<()> {
    let mut enigo = connect()?;
    enigo
        .button(Button::Left, Direction::Click)
        .map_err(|e| PilotError::Input(format!("click: {e}")))
}

/// One wheel notch toward the bottom of the page.
pub fn scroll_down() -> PilotResult<()> {
    let mut enigo = connect()?;
    enigo
        .scroll(1, Axis::Vertical)
        .map_err(|e| PilotError::Input(format!("scroll: {e}")))
}

pub fn type_text(text: &str) -> PilotResult<()> {
    if text.is_empty() {
        return Ok(());
    }
    let mut enigo = connect()?;
    enigo
        .text(text)
        .map_err(|e| PilotError::Input(format!("failed to type text: {e}")))?;
    tracing::debug!(chars = text.chars().count(), "text typed");
    Ok(())
}
