//! The tray glyph: a green battery (body plus tip) on a white square,
//! rendered into an RGBA buffer at startup. No image assets to ship.

pub const ICON_SIZE: u32 = 64;

const BATTERY_GREEN: [u8; 3] = [0x2e, 0x7d, 0x32];
const BACKGROUND: [u8; 3] = [0xff, 0xff, 0xff];

/// Render the battery glyph. Returns the RGBA buffer; dimensions are
/// [`ICON_SIZE`] square.
pub fn battery_glyph() -> Vec<u8> {
    let mut rgba = Vec::with_capacity((ICON_SIZE * ICON_SIZE * 4) as usize);
    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let body = (24..40).contains(&y) && (16..48).contains(&x);
            let tip = (16..24).contains(&y) && (28..36).contains(&x);
            let [r, g, b] = if body || tip { BATTERY_GREEN } else { BACKGROUND };
            rgba.extend_from_slice(&[r, g, b, 0xff]);
        }
    }
    rgba
}
