//! Toast text overlay
//!
//! Draws a message centered horizontally near the bottom of the screen on a
//! semi-transparent box, over an otherwise fully transparent canvas.

use std::path::Path;

use poptart_types::AppearanceConfig;

use crate::manager::ToastWindow;
use crate::platform::PlatformError;
use crate::renderer::{LINE_HEIGHT_FACTOR, colors};
use crate::utils::{color_from_rgba, toast_lines};

/// Where one line of text goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePlacement {
    /// Left edge; negative when the line is wider than the canvas
    pub x: i32,
    pub baseline: i32,
}

/// Geometry of a rendered toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastLayout {
    pub box_x: i32,
    pub box_y: i32,
    pub box_width: u32,
    pub box_height: u32,
    pub lines: Vec<LinePlacement>,
}

/// Lay out measured lines (`(width, height)` each) on a canvas.
///
/// The bottom of the text block sits at
/// `canvas_height - bottom_margin + font_size / 2`, and each line is centered
/// on its own. Text wider than the canvas is clipped, never wrapped.
pub fn layout_toast(
    canvas_width: u32,
    canvas_height: u32,
    lines: &[(u32, u32)],
    font_size: u32,
    bottom_margin: u32,
) -> Option<ToastLayout> {
    if lines.is_empty() {
        return None;
    }

    let y_offset = canvas_height as i32 - bottom_margin as i32 + font_size as i32 / 2;
    let box_width = lines.iter().map(|&(w, _)| w).max().unwrap_or(0);
    let box_height: u32 = lines.iter().map(|&(_, h)| h).sum();
    let box_y = y_offset - box_height as i32;

    let mut line_top = box_y;
    let placements = lines
        .iter()
        .map(|&(w, h)| {
            let placement = LinePlacement {
                x: (canvas_width as i32 - w as i32) / 2,
                baseline: line_top + (h as f32 / LINE_HEIGHT_FACTOR).round() as i32,
            };
            line_top += h as i32;
            placement
        })
        .collect();

    Some(ToastLayout {
        box_x: (canvas_width as i32 - box_width as i32) / 2,
        box_y,
        box_width,
        box_height,
        lines: placements,
    })
}

pub struct ToastOverlay {
    window: ToastWindow,
    appearance: AppearanceConfig,
}

impl ToastOverlay {
    pub fn new(window: ToastWindow, appearance: AppearanceConfig) -> Self {
        Self { window, appearance }
    }

    pub fn window(&self) -> &ToastWindow {
        &self.window
    }

    /// Clear the canvas, draw `text`, and present it.
    ///
    /// Returns the layout used, or `None` when there was nothing to draw.
    pub fn render(
        &mut self,
        text: &str,
        font_size: u32,
    ) -> Result<Option<ToastLayout>, PlatformError> {
        self.window.clear(colors::transparent());

        if font_size == 0 {
            tracing::debug!("font size 0, nothing to draw");
            self.window.commit()?;
            return Ok(None);
        }

        let size = font_size as f32;
        let empty_line_height = (size * LINE_HEIGHT_FACTOR).ceil() as u32;
        let lines = toast_lines(text);
        let measured: Vec<(u32, u32)> = lines
            .iter()
            .map(|line| {
                if line.is_empty() {
                    return (0, empty_line_height);
                }
                let (w, h) = self.window.measure_text(line, size);
                (w.ceil() as u32, (h.ceil() as u32).max(empty_line_height))
            })
            .collect();

        let layout = layout_toast(
            self.window.width(),
            self.window.height(),
            &measured,
            font_size,
            self.appearance.bottom_margin,
        );

        if let Some(ref layout) = layout {
            self.draw(&lines, layout, size);
        }

        self.window.commit()?;
        tracing::debug!(lines = lines.len(), ?layout, "toast rendered");
        Ok(layout)
    }

    fn draw(&mut self, lines: &[&str], layout: &ToastLayout, size: f32) {
        let background = color_from_rgba(self.appearance.background_color);
        if self.appearance.background_color[3] > 0 && layout.box_width > 0 {
            let (x, y) = (layout.box_x as f32, layout.box_y as f32);
            let (w, h) = (layout.box_width as f32, layout.box_height as f32);
            if self.appearance.corner_radius > 0.0 {
                self.window
                    .fill_rounded_rect(x, y, w, h, self.appearance.corner_radius, background);
            } else {
                self.window.fill_rect(x, y, w, h, background);
            }
        }

        let text_color = color_from_rgba(self.appearance.text_color);
        for (line, placement) in lines.iter().zip(&layout.lines) {
            if line.is_empty() {
                continue;
            }
            self.window.draw_text(
                line,
                placement.x as f32,
                placement.baseline as f32,
                size,
                text_color,
            );
        }
    }

    pub fn save_snapshot(&mut self, path: &Path) -> Result<(), PlatformError> {
        self.window.save_snapshot(path)
    }

    /// Put the display back and release the canvas
    pub fn restore(&mut self) -> Result<(), PlatformError> {
        self.window.clear(colors::transparent());
        self.window.restore()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{NativeSurface, SurfaceConfig};
    use crate::renderer::Renderer;

    fn headless_overlay(width: u32, height: u32) -> ToastOverlay {
        let surface = NativeSurface::open(SurfaceConfig::Headless { width, height }).unwrap();
        ToastOverlay::new(
            ToastWindow::new(surface, Renderer::default()),
            AppearanceConfig::default(),
        )
    }

    #[test]
    fn single_line_is_centered_above_bottom_margin() {
        let layout = layout_toast(800, 600, &[(200, 24)], 20, 60).unwrap();
        assert_eq!(layout.box_x, 300);
        assert_eq!(layout.box_y, 526);
        assert_eq!((layout.box_width, layout.box_height), (200, 24));
        assert_eq!(
            layout.lines,
            vec![LinePlacement {
                x: 300,
                baseline: 546
            }]
        );
    }

    #[test]
    fn lines_stack_upward_from_bottom() {
        let layout = layout_toast(800, 600, &[(100, 24), (300, 24)], 20, 60).unwrap();
        assert_eq!((layout.box_x, layout.box_y), (250, 502));
        assert_eq!((layout.box_width, layout.box_height), (300, 48));
        assert_eq!(layout.lines[0], LinePlacement { x: 350, baseline: 522 });
        assert_eq!(layout.lines[1], LinePlacement { x: 250, baseline: 546 });
    }

    #[test]
    fn wide_text_gets_negative_offset() {
        let layout = layout_toast(800, 600, &[(1000, 24)], 20, 60).unwrap();
        assert_eq!(layout.lines[0].x, -100);
    }

    #[test]
    fn no_lines_no_layout() {
        assert!(layout_toast(800, 600, &[], 20, 60).is_none());
    }

    #[test]
    fn empty_message_presents_transparent_canvas() {
        let mut overlay = headless_overlay(64, 48);
        let layout = overlay.render("\n", 20).unwrap();
        assert!(layout.is_none());

        let surface = overlay.window().platform().as_headless().unwrap();
        assert_eq!(surface.commit_count(), 1);
        assert!(surface.presented().iter().all(|&b| b == 0));
    }

    #[test]
    fn render_leaves_top_of_canvas_transparent() {
        let mut overlay = headless_overlay(320, 240);
        let layout = overlay.render("hello\nworld", 20).unwrap().unwrap();
        assert_eq!(layout.lines.len(), 2);

        let surface = overlay.window().platform().as_headless().unwrap();
        assert_eq!(surface.commit_count(), 1);
        // first row is far above the toast
        assert!(surface.presented()[..320 * 4].iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_font_size_presents_transparent_canvas() {
        let mut overlay = headless_overlay(320, 240);
        let layout = overlay.render("hello", 0).unwrap();
        assert!(layout.is_none());

        let surface = overlay.window().platform().as_headless().unwrap();
        assert_eq!(surface.commit_count(), 1);
        assert!(surface.presented().iter().all(|&b| b == 0));
    }

    #[test]
    fn toast_is_drawn_only_inside_its_box() {
        let mut overlay = headless_overlay(320, 240);
        let layout = overlay.render("hello", 20).unwrap().unwrap();
        assert!(layout.box_width > 0 && layout.box_height > 0);

        let surface = overlay.window().platform().as_headless().unwrap();
        let alpha = |x: i32, y: i32| surface.presented()[(y as usize * 320 + x as usize) * 4 + 3];
        let inside = |x: i32, y: i32| {
            (layout.box_x..layout.box_x + layout.box_width as i32).contains(&x)
                && (layout.box_y..layout.box_y + layout.box_height as i32).contains(&y)
        };

        // backing box corner carries the configured 0x80 alpha
        assert_eq!(alpha(layout.box_x, layout.box_y), 0x80);
        for y in 0..240 {
            for x in 0..320 {
                if inside(x, y) {
                    assert!(alpha(x, y) >= 0x80, "({x},{y}) inside box not covered");
                } else {
                    assert_eq!(alpha(x, y), 0, "({x},{y}) outside box was drawn");
                }
            }
        }
    }

    #[test]
    fn restore_clears_presented_frame() {
        let mut overlay = headless_overlay(64, 48);
        overlay.render("x", 12).unwrap();
        overlay.restore().unwrap();

        let surface = overlay.window().platform().as_headless().unwrap();
        assert!(surface.is_restored());
    }
}
