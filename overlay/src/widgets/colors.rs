use tiny_skia::Color;

#[inline]
pub fn transparent() -> Color {
    Color::from_rgba8(0, 0, 0, 0)
}
