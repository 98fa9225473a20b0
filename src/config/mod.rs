pub mod defaults;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub canvas: CanvasSettings,
    pub frame: FrameSettings,
    pub controls: ControlSettings,
    pub export: ExportSettings,
    #[serde(default)]
    pub preview: PreviewSettings,
}

/// Nominal pixel size of the editing canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSettings {
    /// Decorative overlay image drawn on top of the media.
    pub overlay_path: Option<String>,
    /// Public URL of the overlay for the export server.
    /// When unset the overlay path is sent as a `file://` URL.
    #[serde(default)]
    pub overlay_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlSettings {
    pub zoom_min: f64,
    pub zoom_max: f64,
    pub zoom_step: f64,
    #[serde(default)]
    pub rotate_mode: RotateMode,
    /// Joystick movement in canvas pixels per refresh at speed 1.
    pub joystick_base_speed: f64,
    /// Margin that must stay visible when the joystick pushes media off canvas.
    pub joystick_pad: f64,
}

/// Which rotate control the front end shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RotateMode {
    /// Single button, +90° per press.
    Cycle,
    /// One button per absolute angle.
    Absolute,
}

impl Default for RotateMode {
    fn default() -> Self {
        RotateMode::Cycle
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    pub endpoint: String,
    pub jpeg_quality: u8,
    pub image_filename: String,
    pub video_filename: String,
    pub save_directory: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 300 }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSettings {
    pub refresh_hz: u32,
}

impl AppSettings {
    /// Location of the persisted settings file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Frameup")
            .join("settings.json")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        Ok(settings)
    }

    /// Load persisted settings, falling back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("writing settings to {}", path.display()))?;
        Ok(())
    }
}
