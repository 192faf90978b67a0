//! PNG encoding and output persistence.

use std::io;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{Error, Result};
use crate::image::LinearImage;

/// Destination for encoded output files.
pub trait FileSystem {
    /// Writes `bytes` to `path`, replacing any existing file.
    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)
    }
}

/// Quantizes a display-encoded channel to 8 bits.
#[inline]
pub fn quantize_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Quantizes a display-encoded image to packed 8-bit RGBA.
pub fn to_rgba8(image: &LinearImage) -> Vec<u8> {
    image
        .pixels()
        .iter()
        .flat_map(|p| p.map(quantize_u8))
        .collect()
}

/// Encodes a display-encoded image as an 8-bit RGBA PNG.
pub fn encode_png(image: &LinearImage) -> Result<Vec<u8>> {
    let rgba = to_rgba8(image);
    let mut bytes = Vec::new();

    PngEncoder::new(&mut bytes).write_image(
        &rgba,
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;

    Ok(bytes)
}

/// Writes encoded bytes to `path`, overwriting any previous output.
pub fn persist(fs: &dyn FileSystem, path: &Path, bytes: &[u8]) -> Result<()> {
    fs.write_file(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
