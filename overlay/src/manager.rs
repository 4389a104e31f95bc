//! Toast window: a surface paired with a renderer
//!
//! Drawing calls are forwarded to the renderer with the surface's pixel
//! buffer, so callers never juggle buffers and dimensions themselves.

use std::path::Path;

use tiny_skia::Color;

use crate::platform::{NativeSurface, PlatformError, ToastPlatform};
use crate::renderer::{Renderer, colors};
use crate::snapshot;

pub struct ToastWindow {
    platform: NativeSurface,
    renderer: Renderer,
}

impl ToastWindow {
    /// Wrap an open surface and clear it to fully transparent
    pub fn new(platform: NativeSurface, renderer: Renderer) -> Self {
        let mut window = Self { platform, renderer };
        window.clear(colors::transparent());
        window
    }

    pub fn width(&self) -> u32 {
        self.platform.width()
    }

    pub fn height(&self) -> u32 {
        self.platform.height()
    }

    pub fn platform(&self) -> &NativeSurface {
        &self.platform
    }

    pub fn clear(&mut self, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        self.renderer
            .clear(self.platform.pixel_buffer(), width, height, color);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        self.renderer
            .fill_rect(self.platform.pixel_buffer(), width, height, x, y, w, h, color);
    }

    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        self.renderer.fill_rounded_rect(
            self.platform.pixel_buffer(),
            width,
            height,
            x,
            y,
            w,
            h,
            radius,
            color,
        );
    }

    /// Draw one line of text with its baseline at `y`
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        let width = self.platform.width();
        let height = self.platform.height();
        self.renderer.draw_text(
            self.platform.pixel_buffer(),
            width,
            height,
            text,
            x,
            y,
            font_size,
            color,
        );
    }

    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.renderer.measure_text(text, font_size)
    }

    pub fn commit(&mut self) -> Result<(), PlatformError> {
        self.platform.commit()
    }

    pub fn restore(&mut self) -> Result<(), PlatformError> {
        self.platform.restore()
    }

    /// Write the current canvas to a PNG file
    pub fn save_snapshot(&mut self, path: &Path) -> Result<(), PlatformError> {
        let width = self.platform.width();
        let height = self.platform.height();
        snapshot::write_png(path, self.platform.pixel_buffer(), width, height)
    }
}
