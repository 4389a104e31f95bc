//! Platform abstraction for toast surfaces
//!
//! A surface is a full-screen RGBA canvas plus a way to present it. The
//! canvas holds premultiplied RGBA as produced by tiny-skia; each backend
//! converts it to whatever the display wants on `commit`.
use std::path::PathBuf;

pub mod framebuffer;
pub mod headless;

pub use framebuffer::FramebufferSurface;
pub use headless::HeadlessSurface;

/// Which surface to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceConfig {
    /// Linux framebuffer device node, e.g. `/dev/fb0`
    Framebuffer { device: PathBuf },
    /// Off-screen canvas with a fixed size
    Headless { width: u32, height: u32 },
}

/// Errors that can occur in platform operations
#[derive(Debug)]
pub enum PlatformError {
    /// Device node or its sysfs attributes could not be opened
    DeviceUnavailable(String),
    /// Pixel depth or geometry the backend cannot drive
    UnsupportedFormat(String),
    /// Buffer/memory mapping failed
    BufferError(String),
    /// Writing a PNG snapshot failed
    Snapshot(String),
    /// Generic platform error
    Other(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::DeviceUnavailable(s) => write!(f, "Device unavailable: {}", s),
            PlatformError::UnsupportedFormat(s) => write!(f, "Unsupported format: {}", s),
            PlatformError::BufferError(s) => write!(f, "Buffer error: {}", s),
            PlatformError::Snapshot(s) => write!(f, "Snapshot failed: {}", s),
            PlatformError::Other(s) => write!(f, "Platform error: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Trait that all surface backends implement
pub trait ToastPlatform {
    /// Canvas width in pixels
    fn width(&self) -> u32;

    /// Canvas height in pixels
    fn height(&self) -> u32;

    /// Mutable access to the canvas (premultiplied RGBA, `width * height * 4` bytes)
    fn pixel_buffer(&mut self) -> &mut [u8];

    /// Present the canvas over whatever the display showed before
    fn commit(&mut self) -> Result<(), PlatformError>;

    /// Put the display back the way it was found
    fn restore(&mut self) -> Result<(), PlatformError>;
}

/// Surface chosen at runtime from a [`SurfaceConfig`]
pub enum NativeSurface {
    Framebuffer(FramebufferSurface),
    Headless(HeadlessSurface),
}

impl NativeSurface {
    /// Open the surface described by `config`
    pub fn open(config: SurfaceConfig) -> Result<Self, PlatformError> {
        match config {
            SurfaceConfig::Framebuffer { device } => {
                FramebufferSurface::open(&device).map(NativeSurface::Framebuffer)
            }
            SurfaceConfig::Headless { width, height } => {
                HeadlessSurface::new(width, height).map(NativeSurface::Headless)
            }
        }
    }

    /// The off-screen backend, if that is what was opened
    pub fn as_headless(&self) -> Option<&HeadlessSurface> {
        match self {
            Self::Headless(h) => Some(h),
            Self::Framebuffer(_) => None,
        }
    }
}

impl ToastPlatform for NativeSurface {
    fn width(&self) -> u32 {
        match self {
            Self::Framebuffer(fb) => fb.width(),
            Self::Headless(h) => h.width(),
        }
    }

    fn height(&self) -> u32 {
        match self {
            Self::Framebuffer(fb) => fb.height(),
            Self::Headless(h) => h.height(),
        }
    }

    fn pixel_buffer(&mut self) -> &mut [u8] {
        match self {
            Self::Framebuffer(fb) => fb.pixel_buffer(),
            Self::Headless(h) => h.pixel_buffer(),
        }
    }

    fn commit(&mut self) -> Result<(), PlatformError> {
        match self {
            Self::Framebuffer(fb) => fb.commit(),
            Self::Headless(h) => h.commit(),
        }
    }

    fn restore(&mut self) -> Result<(), PlatformError> {
        match self {
            Self::Framebuffer(fb) => fb.restore(),
            Self::Headless(h) => h.restore(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_headless_surface() {
        let surface = NativeSurface::open(SurfaceConfig::Headless {
            width: 64,
            height: 32,
        })
        .unwrap();
        assert_eq!(surface.width(), 64);
        assert_eq!(surface.height(), 32);
        assert!(surface.as_headless().is_some());
    }

    #[test]
    fn missing_device_is_unavailable() {
        let result = NativeSurface::open(SurfaceConfig::Framebuffer {
            device: PathBuf::from("/nonexistent/fb9"),
        });
        assert!(matches!(result, Err(PlatformError::DeviceUnavailable(_))));
    }
}
