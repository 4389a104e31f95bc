//! poptart overlay library
//!
//! Software rendering of toast notifications onto a display surface.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    overlays/                        │
//! │          ToastOverlay, layout_toast                 │
//! │        (text placement and the render pass)         │
//! ├─────────────────────────────────────────────────────┤
//! │                    manager                          │
//! │                  ToastWindow                        │
//! │           (surface + renderer wrapper)              │
//! ├─────────────────────────────────────────────────────┤
//! │                    renderer                         │
//! │            tiny-skia + cosmic-text                  │
//! │              (drawing primitives)                   │
//! ├─────────────────────────────────────────────────────┤
//! │                    platform/                        │
//! │               framebuffer, headless                 │
//! │       (save, composite, present, restore)           │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod manager;
pub mod overlays;
pub mod platform;
pub mod renderer;
pub mod snapshot;
pub mod utils;
pub mod widgets;

pub use manager::ToastWindow;
pub use overlays::{ToastLayout, ToastOverlay, layout_toast};
pub use platform::{NativeSurface, PlatformError, SurfaceConfig, ToastPlatform};
pub use renderer::{Renderer, colors};

pub use tiny_skia::Color;
