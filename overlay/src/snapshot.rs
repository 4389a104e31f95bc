//! PNG snapshots of the toast canvas

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiny_skia::PremultipliedColorU8;

use crate::platform::PlatformError;

/// Convert premultiplied RGBA (as tiny-skia draws it) to straight alpha
pub fn demultiply(premultiplied: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(premultiplied.len());
    for px in premultiplied.chunks_exact(4) {
        let straight = PremultipliedColorU8::from_rgba(px[0], px[1], px[2], px[3])
            .map(|c| c.demultiply())
            .map(|c| [c.red(), c.green(), c.blue(), c.alpha()])
            .unwrap_or([0, 0, 0, 0]);
        out.extend_from_slice(&straight);
    }
    out
}

/// Write a premultiplied RGBA canvas to `path` as an 8-bit RGBA PNG
pub fn write_png(
    path: &Path,
    premultiplied: &[u8],
    width: u32,
    height: u32,
) -> Result<(), PlatformError> {
    let file = File::create(path)
        .map_err(|e| PlatformError::Snapshot(format!("{}: {}", path.display(), e)))?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| PlatformError::Snapshot(format!("{}: {}", path.display(), e)))?;
    writer
        .write_image_data(&demultiply(premultiplied))
        .map_err(|e| PlatformError::Snapshot(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), width, height, "snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demultiply_restores_color() {
        // white at alpha 0x80, premultiplied
        let out = demultiply(&[0x80, 0x80, 0x80, 0x80, 0, 0, 0, 0]);
        assert_eq!(&out[0..4], &[255, 255, 255, 0x80]);
        assert_eq!(&out[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn invalid_premultiplied_pixel_becomes_transparent() {
        // color channel above alpha is not a valid premultiplied pixel
        assert_eq!(demultiply(&[200, 0, 0, 10]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn written_png_decodes() {
        let path = std::env::temp_dir().join(format!("poptart-snapshot-{}.png", std::process::id()));
        let canvas = [0, 0, 0, 0x80, 0xff, 0xff, 0xff, 0xff];
        write_png(&path, &canvas, 2, 1).unwrap();

        let decoder = png::Decoder::new(File::open(&path).unwrap());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (2, 1));
        assert_eq!(&buf[..info.buffer_size()], &[0, 0, 0, 0x80, 0xff, 0xff, 0xff, 0xff]);

        std::fs::remove_file(&path).ok();
    }
}
