use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::errors::{PilotError, PilotResult};
use crate::perception::cursor::composite_cursor;
use crate::provider::Screenshot;

/// Grab the primary monitor at full resolution. Blocking.
pub fn capture_primary_frame() -> PilotResult<RgbaImage> {
    let monitors = xcap::Monitor::all()
        .map_err(|e| PilotError::Capture(format!("enumerate monitors: {e}")))?;
    let monitor = monitors
        .iter()
        .find(|m| m.is_primary())
        .or_else(|| monitors.first())
        .ok_or_else(|| PilotError::Capture("no monitor found".into()))?;

    let frame = monitor
        .capture_image()
        .map_err(|e| PilotError::Capture(format!("capture: {e}")))?;

    // Rebuild from raw RGBA so the buffer type is this crate's `image`.
    let (w, h) = (frame.width(), frame.height());
    RgbaImage::from_raw(w, h, frame.into_raw())
        .ok_or_else(|| PilotError::Capture("capture buffer size mismatch".into()))
}

/// Scale a full-resolution frame to the target size, draw the cursor in
/// (when `cursor` is on screen) and PNG-encode the result.
pub fn scale_and_encode(
    frame: RgbaImage,
    target_width: u32,
    target_height: u32,
    cursor: Option<(i32, i32)>,
) -> PilotResult<Screenshot> {
    let (screen_width, screen_height) = frame.dimensions();
    let mut canvas = if (screen_width, screen_height) == (target_width, target_height) {
        frame
    } else {
        image::imageops::resize(&frame, target_width, target_height, FilterType::Triangle)
    };

    if let Some(pos) = cursor {
        let drawn = composite_cursor(&mut canvas, pos, (screen_width, screen_height));
        tracing::trace!(x = pos.0, y = pos.1, drawn, "cursor composited");
    }

    let png = encode_png(canvas)?;
    Ok(Screenshot {
        png,
        screen_width,
        screen_height,
    })
}

/// PNG-encode as 8-bit RGB; the alpha channel carries nothing for a desktop capture.
pub fn encode_png(canvas: RgbaImage) -> PilotResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(rgb)
        .write_to(&mut std::io::Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| PilotError::Capture(format!("PNG encode: {e}")))?;
    Ok(out)
}
