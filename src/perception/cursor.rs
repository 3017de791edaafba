//! Cursor glyph compositing for scaled screenshots.
//!
//! Screen-capture backends return the desktop without the pointer, so the
//! arrow is drawn back in at the cursor's position mapped into the scaled image.

// 12×19 arrow, hotspot at the tip (0, 0).
// Each row is a u16 where bit 11 = leftmost pixel, bit 0 = rightmost.
const GLYPH_W: u32 = 12;
const OUTLINE: [u16; 19] = [
    0b1000_0000_0000,
    0b1100_0000_0000,
    0b1010_0000_0000,
    0b1001_0000_0000,
    0b1000_1000_0000,
    0b1000_0100_0000,
    0b1000_0010_0000,
    0b1000_0001_0000,
    0b1000_0000_1000,
    0b1000_0000_0100,
    0b1000_0000_0010,
    0b1000_0001_1111,
    0b1000_1001_0000,
    0b1001_1001_0000,
    0b1010_0100_1000,
    0b1100_0100_1000,
    0b1000_0010_0100,
    0b0000_0010_0100,
    0b0000_0001_1000,
];
const FILL: [u16; 19] = [
    0b0000_0000_0000,
    0b0000_0000_0000,
    0b0100_0000_0000,
    0b0110_0000_0000,
    0b0111_0000_0000,
    0b0111_1000_0000,
    0b0111_1100_0000,
    0b0111_1110_0000,
    0b0111_1111_0000,
    0b0111_1111_1000,
    0b0111_1111_1100,
    0b0111_1110_0000,
    0b0111_0110_0000,
    0b0110_0110_0000,
    0b0100_0011_0000,
    0b0000_0011_0000,
    0b0000_0001_1000,
    0b0000_0001_1000,
    0b0000_0000_0000,
];

const OUTLINE_RGBA: [u8; 4] = [0, 0, 0, 255];
const FILL_RGBA: [u8; 4] = [255, 255, 255, 255];

/// Map a physical cursor position into a `target`-sized image of a
/// `screen`-sized desktop. Returns `None` when the cursor is off screen.
pub fn scale_position(
    cursor: (i32, i32),
    screen: (u32, u32),
    target: (u32, u32),
) -> Option<(i32, i32)> {
    let (cx, cy) = cursor;
    let (sw, sh) = screen;
    if sw == 0 || sh == 0 || cx < 0 || cy < 0 || cx as u32 >= sw || cy as u32 >= sh {
        return None;
    }
    let dx = (cx as f64 * target.0 as f64 / sw as f64).round() as i32;
    let dy = (cy as f64 * target.1 as f64 / sh as f64).round() as i32;
    Some((dx, dy))
}

/// Draw the arrow with its tip at (`x`, `y`), clipped to the canvas.
pub fn draw_cursor(canvas: &mut image::RgbaImage, x: i32, y: i32) {
    let (w, h) = canvas.dimensions();
    for (row, (&outline, &fill)) in OUTLINE.iter().zip(FILL.iter()).enumerate() {
        for col in 0..GLYPH_W {
            let bit = 1u16 << (GLYPH_W - 1 - col);
            let colour = if outline & bit != 0 {
                OUTLINE_RGBA
            } else if fill & bit != 0 {
                FILL_RGBA
            } else {
                continue;
            };
            let px = x + col as i32;
            let py = y + row as i32;
            if px < 0 || py < 0 || px as u32 >= w || py as u32 >= h {
                continue;
            }
            *canvas.get_pixel_mut(px as u32, py as u32) = image::Rgba(colour);
        }
    }
}

/// Composite the cursor onto an already-scaled capture. Returns whether it was drawn.
pub fn composite_cursor(
    canvas: &mut image::RgbaImage,
    cursor: (i32, i32),
    screen: (u32, u32),
) -> bool {
    match scale_position(cursor, screen, canvas.dimensions()) {
        Some((x, y)) => {
            draw_cursor(canvas, x, y);
            true
        }
        None => false,
    }
}
