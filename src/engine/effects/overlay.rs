use crate::engine::coords::CanvasSize;
use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;

/// The decorative frame composited over the media. Never transformed; it is
/// always stretched to the full canvas.
#[derive(Debug, Clone)]
pub struct OverlayFrame {
    source: RgbaImage,
    /// `source` resized to the canvas, built on first draw.
    fitted: Option<RgbaImage>,
}

impl OverlayFrame {
    pub fn open(path: &Path) -> Result<Self> {
        let source = image::open(path)
            .with_context(|| format!("loading overlay frame {}", path.display()))?
            .to_rgba8();
        log::info!(
            "Loaded overlay frame {} ({}x{})",
            path.display(),
            source.width(),
            source.height()
        );
        Ok(Self {
            source,
            fitted: None,
        })
    }

    pub fn from_image(source: RgbaImage) -> Self {
        Self {
            source,
            fitted: None,
        }
    }

    pub fn natural_size(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    /// The frame at exactly canvas size.
    pub fn fitted(&mut self, canvas: CanvasSize) -> &RgbaImage {
        let stale = self
            .fitted
            .as_ref()
            .map(|f| f.dimensions() != (canvas.width, canvas.height))
            .unwrap_or(true);
        if stale {
            let fitted = if self.source.dimensions() == (canvas.width, canvas.height) {
                self.source.clone()
            } else {
                image::imageops::resize(
                    &self.source,
                    canvas.width,
                    canvas.height,
                    image::imageops::FilterType::Triangle,
                )
            };
            self.fitted = Some(fitted);
        }
        self.fitted.get_or_insert_with(|| self.source.clone())
    }
}
