//! Off-screen surface
//!
//! Keeps the last committed frame in memory. Used when no display is
//! attached and by the tests.

use super::{PlatformError, ToastPlatform};

pub struct HeadlessSurface {
    width: u32,
    height: u32,
    canvas: Vec<u8>,
    presented: Vec<u8>,
    commits: usize,
    restored: bool,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, PlatformError> {
        if width == 0 || height == 0 {
            return Err(PlatformError::Other(format!(
                "headless surface needs a non-zero size, got {}x{}",
                width, height
            )));
        }
        let len = width as usize * height as usize * 4;
        Ok(Self {
            width,
            height,
            canvas: vec![0; len],
            presented: vec![0; len],
            commits: 0,
            restored: false,
        })
    }

    /// Frame as of the last commit (premultiplied RGBA)
    pub fn presented(&self) -> &[u8] {
        &self.presented
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }
}

impl ToastPlatform for HeadlessSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel_buffer(&mut self) -> &mut [u8] {
        &mut self.canvas
    }

    fn commit(&mut self) -> Result<(), PlatformError> {
        self.presented.copy_from_slice(&self.canvas);
        self.commits += 1;
        self.restored = false;
        Ok(())
    }

    fn restore(&mut self) -> Result<(), PlatformError> {
        self.presented.fill(0);
        self.restored = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_rejected() {
        assert!(HeadlessSurface::new(0, 10).is_err());
    }

    #[test]
    fn commit_then_restore() {
        let mut surface = HeadlessSurface::new(2, 2).unwrap();
        surface.pixel_buffer().fill(0xff);
        assert!(surface.presented().iter().all(|&b| b == 0));

        surface.commit().unwrap();
        assert_eq!(surface.commit_count(), 1);
        assert!(surface.presented().iter().all(|&b| b == 0xff));

        surface.restore().unwrap();
        assert!(surface.is_restored());
        assert!(surface.presented().iter().all(|&b| b == 0));
    }
}
