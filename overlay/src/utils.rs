//! Small helpers shared by the toast renderer

use tiny_skia::Color;

/// Convert [u8; 4] RGBA array to tiny_skia Color
#[inline]
pub fn color_from_rgba(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Split a message into display lines.
///
/// Trailing whitespace is dropped (command output usually ends in a
/// newline); blank lines in the middle are kept.
pub fn toast_lines(text: &str) -> Vec<&str> {
    let text = text.trim_end();
    if text.is_empty() {
        return Vec::new();
    }
    text.lines().map(str::trim_end).collect()
}
