pub mod ffmpeg;

use crate::error::{EditorError, EditorResult};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv", "avi"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a file by extension. Anything not recognised as video is
    /// handed to the image decoder.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }

    pub fn mime_for(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            "webm" => "video/webm",
            "mkv" => "video/x-matroska",
            "avi" => "video/x-msvideo",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }
}

/// A loaded photo or video clip. Replaced wholesale on every upload.
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub kind: MediaKind,
    pub natural_width: u32,
    pub natural_height: u32,
    /// Pixels drawn on the canvas. For video this is the poster frame, which
    /// may be missing when ffmpeg could not decode one.
    pub frame: Option<RgbaImage>,
    pub path: PathBuf,
}

impl MediaSource {
    pub fn from_image(path: PathBuf, img: RgbaImage) -> Self {
        Self {
            kind: MediaKind::Image,
            natural_width: img.width(),
            natural_height: img.height(),
            frame: Some(img),
            path,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string())
    }
}

/// Decode a still image from disk.
pub fn load_image(path: &Path) -> EditorResult<MediaSource> {
    let img = image::open(path).map_err(EditorError::ImageDecode)?.to_rgba8();
    log::info!(
        "Loaded image {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(MediaSource::from_image(path.to_path_buf(), img))
}

/// Open a video clip. Probing or poster extraction failures are tolerated:
/// the source still loads, falling back to a 1×1 natural size.
pub fn load_video(path: &Path) -> MediaSource {
    let (natural_width, natural_height) = match ffmpeg::probe_dimensions(path) {
        Ok(dims) => dims,
        Err(e) => {
            log::warn!("Could not probe {}: {:#}", path.display(), e);
            (1, 1)
        }
    };

    let frame = match ffmpeg::extract_poster_frame(path) {
        Ok(img) => Some(img),
        Err(e) => {
            log::warn!("No poster frame for {}: {:#}", path.display(), e);
            None
        }
    };

    // Decoded frame wins if the probe disagreed or failed.
    let (natural_width, natural_height) = match &frame {
        Some(img) if (natural_width, natural_height) == (1, 1) => img.dimensions(),
        _ => (natural_width, natural_height),
    };

    log::info!(
        "Loaded video {} ({}x{}, poster: {})",
        path.display(),
        natural_width,
        natural_height,
        frame.is_some()
    );

    MediaSource {
        kind: MediaKind::Video,
        natural_width,
        natural_height,
        frame,
        path: path.to_path_buf(),
    }
}

/// Load whatever the user picked.
pub fn load(path: &Path) -> EditorResult<MediaSource> {
    match MediaKind::from_path(path) {
        MediaKind::Image => load_image(path),
        MediaKind::Video => Ok(load_video(path)),
    }
}
