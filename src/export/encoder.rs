use crate::engine::compositor::composite;
use crate::engine::effects::background::{create_background_image, BackgroundFill};
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Put the canvas on an opaque white surface of the same size.
pub fn flatten_on_white(canvas: &RgbaImage) -> RgbaImage {
    let mut out = create_background_image(canvas.width(), canvas.height(), BackgroundFill::WHITE);
    composite(&mut out, canvas, 0, 0);
    out
}

pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .context("encoding JPEG")?;
    Ok(bytes)
}

/// Flatten, encode and save the canvas as `<dir>/<filename>`.
pub fn export_image(canvas: &RgbaImage, quality: u8, dir: &Path, filename: &str) -> Result<PathBuf> {
    let flat = flatten_on_white(canvas);
    let bytes = encode_jpeg(&flat, quality)?;
    let path = write_atomically(dir, filename, &bytes)?;
    log::info!("Exported image to {}", path.display());
    Ok(path)
}

/// Write through a temp file in the same directory so a failed export never
/// leaves a partial file under the final name.
pub(crate) fn write_atomically(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    let dest = dir.join(filename);
    tmp.persist(&dest)
        .with_context(|| format!("saving {}", dest.display()))?;
    Ok(dest)
}
