//! PNG output encoder.
//!
//! Pure Rust PNG encoding using the `png` crate.

use crate::error::Result;
use crate::framebuffer::Framebuffer;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// PNG encoder for framebuffer output.
pub struct PngEncoder;

impl PngEncoder {
    /// Write a framebuffer to a PNG file.
    ///
    /// # Errors
    ///
    /// Returns an error if file creation or PNG encoding fails.
    pub fn write_to_file<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<()> {
        let file = File::create(path)?;
        Self::encode(fb, BufWriter::new(file))
    }

    /// Save a figure snapshot as `folder/name`, enlarged `scale` times.
    ///
    /// The folder is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or file cannot be created, or `scale`
    /// is zero.
    pub fn save_snapshot(
        fb: &Framebuffer,
        folder: &Path,
        name: &str,
        scale: u32,
    ) -> Result<PathBuf> {
        fs::create_dir_all(folder)?;
        let path = folder.join(name);

        let enlarged = fb.upscale(scale)?;
        Self::write_to_file(&enlarged, &path)?;

        log::info!(
            "saved {}x{} snapshot to {}",
            enlarged.width(),
            enlarged.height(),
            path.display()
        );
        Ok(path)
    }

    fn encode<W: Write>(fb: &Framebuffer, writer: W) -> Result<()> {
        let mut encoder = png::Encoder::new(writer, fb.width(), fb.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        // Use compact pixels to handle stride padding
        writer.write_image_data(&fb.to_compact_pixels())?;
        writer.finish()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::RED);

        PngEncoder::write_to_file(&fb, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_png_header_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.png");
        let fb = Framebuffer::new(37, 21).unwrap();
        PngEncoder::write_to_file(&fb, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();

        // IHDR is the first chunk: width and height are big-endian u32s
        assert_eq!(&bytes[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]), 37);
        assert_eq!(u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]), 21);
    }

    #[test]
    fn test_save_snapshot_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("captures").join("today");
        let mut fb = Framebuffer::new(8, 6).unwrap();
        fb.clear(Rgba::FACE);

        let path = PngEncoder::save_snapshot(&fb, &folder, "simple_pic.png", 3).unwrap();

        assert_eq!(path, folder.join("simple_pic.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..8], &PNG_SIGNATURE);
        assert_eq!(u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]), 24);
        assert_eq!(u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]), 18);
    }

    #[test]
    fn test_save_snapshot_rejects_zero_scale() {
        let dir = tempfile::tempdir().unwrap();
        let fb = Framebuffer::new(2, 2).unwrap();
        assert!(PngEncoder::save_snapshot(&fb, dir.path(), "x.png", 0).is_err());
    }
}
