//! Shared configuration types for poptart
//!
//! These are the persisted defaults loaded through `confy`. Both the binary
//! crate and the overlay crate read them, so they live in their own crate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted defaults for a toast. CLI flags override these per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToastConfig {
    /// Seconds to show the toast. Negative means forever.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,
    #[serde(default)]
    pub appearance: AppearanceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_duration_secs() -> f64 {
    2.0
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            appearance: AppearanceConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Appearance
// ─────────────────────────────────────────────────────────────────────────────

/// How the toast text and its backing box look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceConfig {
    /// Font size in pixels (default 20)
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Text color (RGBA)
    #[serde(default = "default_text_color")]
    pub text_color: [u8; 4],
    /// Box drawn behind the text (RGBA)
    #[serde(default = "default_background_color")]
    pub background_color: [u8; 4],
    /// Distance from the bottom edge of the screen to the text baseline,
    /// before the half-font-size adjustment
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: u32,
    /// Corner radius of the backing box; 0 draws a plain rectangle
    #[serde(default)]
    pub corner_radius: f32,
    /// Font family name. Falls back to the system sans-serif when unset.
    #[serde(default)]
    pub font_family: Option<String>,
    /// Extra directory scanned for font files
    #[serde(default)]
    pub font_dir: Option<PathBuf>,
}

fn default_font_size() -> u32 {
    20
}
fn default_text_color() -> [u8; 4] {
    [255, 255, 255, 255]
}
fn default_background_color() -> [u8; 4] {
    [0, 0, 0, 0x80]
}
fn default_bottom_margin() -> u32 {
    60
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            text_color: default_text_color(),
            background_color: default_background_color(),
            bottom_margin: default_bottom_margin(),
            corner_radius: 0.0,
            font_family: None,
            font_dir: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display
// ─────────────────────────────────────────────────────────────────────────────

/// Where the toast is shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Framebuffer device node
    #[serde(default = "default_device")]
    pub device: PathBuf,
    /// Canvas width used when rendering off-screen
    #[serde(default = "default_headless_width")]
    pub headless_width: u32,
    /// Canvas height used when rendering off-screen
    #[serde(default = "default_headless_height")]
    pub headless_height: u32,
}

fn default_device() -> PathBuf {
    PathBuf::from("/dev/fb0")
}
fn default_headless_width() -> u32 {
    1280
}
fn default_headless_height() -> u32 {
    720
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            headless_width: default_headless_width(),
            headless_height: default_headless_height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ToastConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ToastConfig::default());
        assert_eq!(config.appearance.font_size, 20);
        assert_eq!(config.appearance.background_color, [0, 0, 0, 0x80]);
        assert_eq!(config.display.device, PathBuf::from("/dev/fb0"));
    }

    #[test]
    fn partial_appearance_keeps_other_defaults() {
        let config: ToastConfig =
            serde_json::from_str(r#"{"appearance": {"font_size": 32}}"#).unwrap();
        assert_eq!(config.appearance.font_size, 32);
        assert_eq!(config.appearance.bottom_margin, 60);
        assert_eq!(config.duration_secs, 2.0);
    }
}
