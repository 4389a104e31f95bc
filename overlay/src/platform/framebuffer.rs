//! Linux framebuffer backend
//!
//! The framebuffer has no layers, so the toast is emulated as one: the screen
//! contents are saved when the device is opened, every commit blends the
//! canvas over that saved image, and `restore` writes the saved image back.
//!
//! Geometry comes from sysfs (`/sys/class/graphics/fbN/`) rather than ioctls.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use super::{PlatformError, ToastPlatform};

const SYSFS_GRAPHICS: &str = "/sys/class/graphics";

/// Pixel layouts the backend can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32 bpp, bytes in memory are B, G, R, X
    Xrgb8888,
    /// 16 bpp, little-endian 5-6-5
    Rgb565,
}

impl PixelFormat {
    pub fn from_bits_per_pixel(bpp: u32) -> Result<Self, PlatformError> {
        match bpp {
            32 => Ok(Self::Xrgb8888),
            16 => Ok(Self::Rgb565),
            other => Err(PlatformError::UnsupportedFormat(format!(
                "{} bits per pixel",
                other
            ))),
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Xrgb8888 => 4,
            Self::Rgb565 => 2,
        }
    }

    /// Decode one device pixel to (r, g, b)
    #[inline]
    pub fn decode(self, px: &[u8]) -> (u8, u8, u8) {
        match self {
            Self::Xrgb8888 => (px[2], px[1], px[0]),
            Self::Rgb565 => {
                let v = u16::from_le_bytes([px[0], px[1]]);
                let r = ((v >> 11) & 0x1f) as u8;
                let g = ((v >> 5) & 0x3f) as u8;
                let b = (v & 0x1f) as u8;
                ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
            }
        }
    }

    /// Encode (r, g, b) into one device pixel
    #[inline]
    pub fn encode(self, rgb: (u8, u8, u8), out: &mut [u8]) {
        let (r, g, b) = rgb;
        match self {
            Self::Xrgb8888 => {
                out[0] = b;
                out[1] = g;
                out[2] = r;
                out[3] = 0xff;
            }
            Self::Rgb565 => {
                let v = ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3);
                out[..2].copy_from_slice(&v.to_le_bytes());
            }
        }
    }
}

/// Visible size and memory layout of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FbGeometry {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Bytes per scanline
    pub stride: usize,
}

impl FbGeometry {
    /// Bytes covering the visible area
    pub fn visible_len(&self) -> usize {
        self.stride * self.height as usize
    }

    /// Read geometry from a sysfs directory such as `/sys/class/graphics/fb0`
    pub fn from_sysfs(dir: &Path) -> Result<Self, PlatformError> {
        let read = |name: &str| {
            fs::read_to_string(dir.join(name)).map_err(|e| {
                PlatformError::DeviceUnavailable(format!("{}: {}", dir.join(name).display(), e))
            })
        };

        // `modes` reports the visible mode; `virtual_size` may include
        // off-screen panning area, so it is only a fallback
        let (width, height) = read("modes")
            .ok()
            .and_then(|s| parse_mode(&s))
            .map_or_else(
                || {
                    let raw = read("virtual_size")?;
                    parse_virtual_size(&raw).ok_or_else(|| {
                        PlatformError::UnsupportedFormat(format!("virtual_size {:?}", raw.trim()))
                    })
                },
                Ok,
            )?;

        let bpp_raw = read("bits_per_pixel")?;
        let bpp = bpp_raw.trim().parse::<u32>().map_err(|_| {
            PlatformError::UnsupportedFormat(format!("bits_per_pixel {:?}", bpp_raw.trim()))
        })?;
        let format = PixelFormat::from_bits_per_pixel(bpp)?;

        let stride = read("stride")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(width as usize * format.bytes_per_pixel());

        Self::new(width, height, format, stride)
    }

    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
    ) -> Result<Self, PlatformError> {
        if width == 0 || height == 0 {
            return Err(PlatformError::UnsupportedFormat(format!(
                "empty display {}x{}",
                width, height
            )));
        }
        if stride < width as usize * format.bytes_per_pixel() {
            return Err(PlatformError::UnsupportedFormat(format!(
                "stride {} too small for width {}",
                stride, width
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            stride,
        })
    }
}

/// Parse the first line of sysfs `modes`, e.g. `U:1920x1080p-0`
pub fn parse_mode(s: &str) -> Option<(u32, u32)> {
    let line = s.lines().next()?.trim();
    let mode = line.split_once(':').map_or(line, |(_, rest)| rest);
    let (w, rest) = mode.split_once('x')?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    Some((w.parse().ok()?, digits.parse().ok()?))
}

/// Parse sysfs `virtual_size`, e.g. `1920,1080`
pub fn parse_virtual_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.trim().split_once(',')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

/// sysfs directory for a device node: `/dev/fb1` -> `/sys/class/graphics/fb1`
pub fn sysfs_dir(device: &Path) -> PathBuf {
    let name = device.file_name().unwrap_or(device.as_os_str());
    Path::new(SYSFS_GRAPHICS).join(name)
}

/// Blend one row of premultiplied RGBA canvas over saved device pixels
pub fn composite_row(canvas: &[u8], saved: &[u8], out: &mut [u8], format: PixelFormat) {
    let bpp = format.bytes_per_pixel();
    for ((src, bg), dst) in canvas
        .chunks_exact(4)
        .zip(saved.chunks_exact(bpp))
        .zip(out.chunks_exact_mut(bpp))
    {
        let a = src[3] as u32;
        if a == 0 {
            dst.copy_from_slice(bg);
            continue;
        }
        let inv = 255 - a;
        let (br, bgc, bb) = format.decode(bg);
        let blend = |s: u8, d: u8| (s as u32 + d as u32 * inv / 255).min(255) as u8;
        format.encode(
            (blend(src[0], br), blend(src[1], bgc), blend(src[2], bb)),
            dst,
        );
    }
}

/// A toast surface drawn straight onto `/dev/fbN`
pub struct FramebufferSurface {
    device: PathBuf,
    geometry: FbGeometry,
    mmap: MmapMut,
    /// Screen contents at open time (visible area only)
    saved: Vec<u8>,
    canvas: Vec<u8>,
    restored: bool,
}

impl FramebufferSurface {
    /// Map the device and save what is currently on screen
    pub fn open(device: &Path) -> Result<Self, PlatformError> {
        let geometry = FbGeometry::from_sysfs(&sysfs_dir(device))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(device)
            .map_err(|e| PlatformError::DeviceUnavailable(format!("{}: {}", device.display(), e)))?;

        // SAFETY: the mapping is only accessed through this struct, and the
        // length covers the visible area reported by the driver
        let mmap = unsafe { MmapOptions::new().len(geometry.visible_len()).map_mut(&file) }
            .map_err(|e| PlatformError::BufferError(format!("mmap {}: {}", device.display(), e)))?;

        let saved = mmap[..geometry.visible_len()].to_vec();
        let canvas = vec![0u8; geometry.width as usize * geometry.height as usize * 4];

        tracing::debug!(
            device = %device.display(),
            width = geometry.width,
            height = geometry.height,
            format = ?geometry.format,
            stride = geometry.stride,
            "framebuffer opened"
        );

        Ok(Self {
            device: device.to_path_buf(),
            geometry,
            mmap,
            saved,
            canvas,
            restored: false,
        })
    }
}

impl ToastPlatform for FramebufferSurface {
    fn width(&self) -> u32 {
        self.geometry.width
    }

    fn height(&self) -> u32 {
        self.geometry.height
    }

    fn pixel_buffer(&mut self) -> &mut [u8] {
        &mut self.canvas
    }

    fn commit(&mut self) -> Result<(), PlatformError> {
        let FbGeometry {
            width,
            format,
            stride,
            ..
        } = self.geometry;
        let canvas_stride = width as usize * 4;
        let row_bytes = width as usize * format.bytes_per_pixel();

        for (y, canvas_row) in self.canvas.chunks_exact(canvas_stride).enumerate() {
            let start = y * stride;
            composite_row(
                canvas_row,
                &self.saved[start..start + row_bytes],
                &mut self.mmap[start..start + row_bytes],
                format,
            );
        }
        self.restored = false;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), PlatformError> {
        let len = self.saved.len();
        self.mmap[..len].copy_from_slice(&self.saved);
        self.restored = true;
        tracing::debug!(device = %self.device.display(), "framebuffer restored");
        Ok(())
    }
}

impl Drop for FramebufferSurface {
    fn drop(&mut self) {
        if !self.restored
            && let Err(e) = self.restore()
        {
            tracing::warn!(error = %e, "failed to restore framebuffer on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode_line() {
        assert_eq!(parse_mode("U:1920x1080p-0\n"), Some((1920, 1080)));
        assert_eq!(parse_mode("S:640x480p-60\nU:800x600p-0\n"), Some((640, 480)));
        assert_eq!(parse_mode("1024x768"), Some((1024, 768)));
        assert_eq!(parse_mode(""), None);
        assert_eq!(parse_mode("U:garbage"), None);
    }

    #[test]
    fn parse_virtual_size_pair() {
        assert_eq!(parse_virtual_size("1920,2160\n"), Some((1920, 2160)));
        assert_eq!(parse_virtual_size("1920"), None);
    }

    #[test]
    fn sysfs_dir_uses_device_name() {
        assert_eq!(
            sysfs_dir(Path::new("/dev/fb1")),
            PathBuf::from("/sys/class/graphics/fb1")
        );
    }

    #[test]
    fn unsupported_depth() {
        assert!(matches!(
            PixelFormat::from_bits_per_pixel(24),
            Err(PlatformError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn stride_must_cover_width() {
        assert!(FbGeometry::new(100, 10, PixelFormat::Xrgb8888, 399).is_err());
        let geo = FbGeometry::new(100, 10, PixelFormat::Rgb565, 256).unwrap();
        assert_eq!(geo.visible_len(), 2560);
    }

    #[test]
    fn rgb565_round_trips_primaries() {
        let mut px = [0u8; 2];
        for rgb in [(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 255), (0, 0, 0)] {
            PixelFormat::Rgb565.encode(rgb, &mut px);
            assert_eq!(PixelFormat::Rgb565.decode(&px), rgb);
        }
    }

    #[test]
    fn transparent_canvas_keeps_background() {
        let canvas = [0u8; 8];
        let saved = [10, 20, 30, 0xff, 40, 50, 60, 0xff];
        let mut out = [0u8; 8];
        composite_row(&canvas, &saved, &mut out, PixelFormat::Xrgb8888);
        assert_eq!(out, saved);
    }

    #[test]
    fn half_black_darkens_background() {
        // premultiplied black at alpha 0x80 over white
        let canvas = [0, 0, 0, 0x80];
        let saved = [0xff, 0xff, 0xff, 0xff];
        let mut out = [0u8; 4];
        composite_row(&canvas, &saved, &mut out, PixelFormat::Xrgb8888);
        assert_eq!(out, [127, 127, 127, 0xff]);
    }

    #[test]
    fn opaque_white_replaces_background() {
        let canvas = [0xff, 0xff, 0xff, 0xff];
        let saved = [0x00, 0x00];
        let mut out = [0u8; 2];
        composite_row(&canvas, &saved, &mut out, PixelFormat::Rgb565);
        assert_eq!(out, [0xff, 0xff]);
    }
}
