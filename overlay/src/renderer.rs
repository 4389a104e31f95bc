//! Software renderer using tiny-skia and cosmic-text
//!
//! All drawing happens on the CPU into an RGBA pixel buffer owned by the
//! platform surface. The renderer never touches the display itself.
#![allow(clippy::too_many_arguments)]
use std::collections::HashMap;
use std::path::Path;

use cosmic_text::{
    Attrs, Buffer, Color as CosmicColor, Family, FontSystem, LayoutGlyph, Metrics, Shaping,
    SwashCache,
};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, PixmapMut, Rect, Transform};

pub use crate::widgets::colors;

/// Maximum entries in the text shaping cache (LRU eviction when exceeded)
const TEXT_CACHE_MAX_ENTRIES: usize = 64;

/// Line height as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Cached result of text shaping
struct CachedText {
    glyphs: Vec<LayoutGlyph>,
    width: f32,
    height: f32,
    last_used: u64,
}

/// Key for text cache: (text content, font size rounded to tenths)
type TextCacheKey = (String, u32);

/// A software renderer for toast content
pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    font_family: Option<String>,
    /// Loop mode with a fixed message re-renders the same string every period
    text_cache: HashMap<TextCacheKey, CachedText>,
    cache_access_counter: u64,
}

impl Renderer {
    /// Create a renderer using the system fonts.
    ///
    /// `font_family` selects a named family, otherwise the default sans-serif
    /// face is used. `font_dir` is scanned for additional font files.
    pub fn new(font_family: Option<&str>, font_dir: Option<&Path>) -> Self {
        let mut font_system = FontSystem::new();
        if let Some(dir) = font_dir {
            tracing::debug!(dir = %dir.display(), "loading extra fonts");
            font_system.db_mut().load_fonts_dir(dir);
        }

        Self {
            font_system,
            swash_cache: SwashCache::new(),
            font_family: font_family.map(str::to_string),
            text_cache: HashMap::with_capacity(16),
            cache_access_counter: 0,
        }
    }

    fn evict_lru_if_needed(&mut self) {
        if self.text_cache.len() <= TEXT_CACHE_MAX_ENTRIES {
            return;
        }

        let target_size = TEXT_CACHE_MAX_ENTRIES * 3 / 4;
        let mut entries: Vec<_> = self
            .text_cache
            .iter()
            .map(|(k, v)| (k.clone(), v.last_used))
            .collect();
        entries.sort_by_key(|(_, last_used)| *last_used);

        for (key, _) in entries
            .into_iter()
            .take(self.text_cache.len() - target_size)
        {
            self.text_cache.remove(&key);
        }
    }

    fn find_cached(&mut self, text: &str, font_size_key: u32) -> Option<&mut CachedText> {
        self.text_cache
            .iter_mut()
            .find(|(k, _)| k.0 == text && k.1 == font_size_key)
            .map(|(_, v)| v)
    }

    /// Ensure text is shaped and cached. Returns (width, height).
    ///
    /// A size that is not positive has no extent; cosmic-text cannot lay out
    /// a zero line height.
    fn ensure_cached(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        if !font_size.is_finite() || font_size <= 0.0 {
            return (0.0, 0.0);
        }
        let font_size_key = (font_size * 10.0).round() as u32;

        self.cache_access_counter += 1;
        let current_access = self.cache_access_counter;

        if let Some(cached) = self.find_cached(text, font_size_key) {
            cached.last_used = current_access;
            return (cached.width, cached.height);
        }

        let metrics = Metrics::new(font_size, font_size * LINE_HEIGHT_FACTOR);
        let mut text_buffer = Buffer::new(&mut self.font_system, metrics);

        let family = match self.font_family.as_deref() {
            Some(name) => Family::Name(name),
            None => Family::SansSerif,
        };
        let attrs = Attrs::new().family(family);
        text_buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);
        text_buffer.shape_until_scroll(&mut self.font_system, false);

        let mut glyphs = Vec::new();
        let mut width = 0.0f32;
        let mut height = 0.0f32;

        for run in text_buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
            glyphs.extend(run.glyphs.iter().cloned());
        }

        self.text_cache.insert(
            (text.to_string(), font_size_key),
            CachedText {
                glyphs,
                width,
                height,
                last_used: current_access,
            },
        );
        self.evict_lru_if_needed();

        (width, height)
    }

    fn get_cached_glyphs(&mut self, text: &str, font_size: f32) -> Vec<LayoutGlyph> {
        let font_size_key = (font_size * 10.0).round() as u32;
        self.find_cached(text, font_size_key)
            .map(|c| c.glyphs.clone())
            .unwrap_or_default()
    }

    /// Fill the whole buffer with a color
    pub fn clear(&self, buffer: &mut [u8], width: u32, height: u32, color: Color) {
        if let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) {
            pixmap.fill(color);
        }
    }

    /// Draw a filled rectangle
    pub fn fill_rect(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Draw a rounded rectangle (filled)
    pub fn fill_rounded_rect(
        &self,
        buffer: &mut [u8],
        width: u32,
        height: u32,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, width, height) else {
            return;
        };
        let Some(path) = create_rounded_rect_path(x, y, w, h, radius) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;

        pixmap.fill_path(
            &path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Draw a single line of text with its baseline at `y`
    pub fn draw_text(
        &mut self,
        buffer: &mut [u8],
        buf_width: u32,
        buf_height: u32,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    ) {
        let Some(mut pixmap) = PixmapMut::from_bytes(buffer, buf_width, buf_height) else {
            return;
        };

        let _ = self.ensure_cached(text, font_size);
        // swash_cache needs &mut self, so the glyphs are cloned out first
        let glyphs = self.get_cached_glyphs(text, font_size);

        let rgba = color.to_color_u8();
        let text_color = CosmicColor::rgba(rgba.red(), rgba.green(), rgba.blue(), rgba.alpha());

        for glyph in &glyphs {
            let physical_glyph = glyph.physical((x, y), 1.0);

            if let Some(image) = self
                .swash_cache
                .get_image(&mut self.font_system, physical_glyph.cache_key)
            {
                let glyph_x = physical_glyph.x + image.placement.left;
                let glyph_y = physical_glyph.y - image.placement.top;

                draw_glyph_to_pixmap(
                    &mut pixmap,
                    &image.data,
                    image.placement.width,
                    image.placement.height,
                    glyph_x,
                    glyph_y,
                    text_color,
                );
            }
        }
    }

    /// Measure text dimensions (uses shaping cache)
    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.ensure_cached(text, font_size)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(None, None)
    }
}

fn create_rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<tiny_skia::Path> {
    let r = r.min(w / 2.0).min(h / 2.0);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Blend a glyph coverage mask onto a premultiplied RGBA pixmap
fn draw_glyph_to_pixmap(
    pixmap: &mut PixmapMut,
    glyph_data: &[u8],
    glyph_width: u32,
    glyph_height: u32,
    dest_x: i32,
    dest_y: i32,
    color: CosmicColor,
) {
    let pixmap_width = pixmap.width() as i32;
    let pixmap_height = pixmap.height() as i32;
    let data = pixmap.data_mut();

    for gy in 0..glyph_height as i32 {
        let py = dest_y + gy;
        if py < 0 || py >= pixmap_height {
            continue;
        }

        for gx in 0..glyph_width as i32 {
            let px = dest_x + gx;
            if px < 0 || px >= pixmap_width {
                continue;
            }

            let glyph_idx = (gy as u32 * glyph_width + gx as u32) as usize;
            let Some(&alpha) = glyph_data.get(glyph_idx) else {
                continue;
            };
            if alpha == 0 {
                continue;
            }

            let pixel_idx = ((py as u32 * pixmap_width as u32 + px as u32) * 4) as usize;
            if pixel_idx + 3 >= data.len() {
                continue;
            }

            let src_a = (alpha as u32 * color.a() as u32) / 255;
            let inv_a = 255 - src_a;

            data[pixel_idx] =
                ((color.r() as u32 * src_a + data[pixel_idx] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 1] =
                ((color.g() as u32 * src_a + data[pixel_idx + 1] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 2] =
                ((color.b() as u32 * src_a + data[pixel_idx + 2] as u32 * inv_a) / 255) as u8;
            data[pixel_idx + 3] = (src_a + (data[pixel_idx + 3] as u32 * inv_a) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u32, height: u32) -> Vec<u8> {
        vec![0u8; (width * height * 4) as usize]
    }

    #[test]
    fn clear_fills_every_pixel() {
        let renderer = Renderer::default();
        let mut buffer = buffer(4, 3);
        renderer.clear(&mut buffer, 4, 3, Color::WHITE);
        assert!(buffer.iter().all(|&b| b == 255));
    }

    #[test]
    fn fill_rect_only_touches_the_rect() {
        let renderer = Renderer::default();
        let mut buffer = buffer(4, 4);
        renderer.fill_rect(&mut buffer, 4, 4, 0.0, 0.0, 2.0, 2.0, Color::WHITE);

        // (0,0) inside, (3,3) outside
        assert_eq!(&buffer[0..4], &[255, 255, 255, 255]);
        let last = (3 * 4 + 3) * 4;
        assert_eq!(&buffer[last..last + 4], &[0, 0, 0, 0]);
    }

    #[test]
    fn glyph_blend_clips_to_pixmap() {
        let mut buffer = buffer(2, 2);
        let mut pixmap = PixmapMut::from_bytes(&mut buffer, 2, 2).unwrap();
        let mask = [255u8; 9];
        draw_glyph_to_pixmap(
            &mut pixmap,
            &mask,
            3,
            3,
            -1,
            -1,
            CosmicColor::rgba(255, 255, 255, 255),
        );
        assert!(buffer.iter().all(|&b| b == 255));
    }

    #[test]
    fn empty_text_measures_zero_width() {
        let mut renderer = Renderer::default();
        let (w, _) = renderer.measure_text("", 20.0);
        assert_eq!(w, 0.0);
    }

    #[test]
    fn zero_size_text_has_no_extent() {
        let mut renderer = Renderer::default();
        assert_eq!(renderer.measure_text("hello", 0.0), (0.0, 0.0));

        let mut buffer = buffer(8, 8);
        renderer.draw_text(&mut buffer, 8, 8, "hello", 0.0, 6.0, 0.0, Color::WHITE);
        assert!(buffer.iter().all(|&b| b == 0));
    }
}
