use crate::config::FrameSettings;
use crate::engine::coords::CanvasSize;
use crate::engine::transform::TransformState;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The `params` field of the video export request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoExportParams {
    pub pos_x: f64,
    pub pos_y: f64,
    pub scale: f64,
    pub rotation_deg: f64,
    pub canvas_w: u32,
    pub canvas_h: u32,
    pub frame_url: Option<String>,
}

impl VideoExportParams {
    pub fn new(transform: &TransformState, canvas: CanvasSize, frame_url: Option<String>) -> Self {
        Self {
            pos_x: transform.pos_x,
            pos_y: transform.pos_y,
            scale: transform.scale,
            rotation_deg: transform.rotation_deg,
            canvas_w: canvas.width,
            canvas_h: canvas.height,
            frame_url,
        }
    }
}

/// Absolute URL of the overlay frame for the export server: the configured
/// public URL if any, else the overlay file as a `file://` URL.
pub fn resolve_frame_url(frame: &FrameSettings) -> Option<String> {
    if let Some(url) = frame.overlay_url.as_ref().filter(|u| !u.trim().is_empty()) {
        return Some(url.clone());
    }
    let path = frame.overlay_path.as_ref()?;
    file_url(Path::new(path))
}

fn file_url(path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    reqwest::Url::from_file_path(&absolute)
        .ok()
        .map(|u| u.to_string())
}
