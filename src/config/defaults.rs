use super::*;

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            canvas: CanvasSettings::default(),
            frame: FrameSettings::default(),
            controls: ControlSettings::default(),
            export: ExportSettings::default(),
            preview: PreviewSettings::default(),
        }
    }
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1350, // 4:5 portrait
        }
    }
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            overlay_path: Some("frames/frame.png".to_string()),
            overlay_url: None,
        }
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            zoom_min: 0.05,
            zoom_max: 5.0,
            zoom_step: 0.01,
            rotate_mode: RotateMode::Cycle,
            joystick_base_speed: 2.0,
            joystick_pad: 80.0,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        let save_dir = dirs::download_dir()
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        Self {
            endpoint: "http://localhost:8888/.netlify/functions/export-mp4".to_string(),
            jpeg_quality: 92,
            image_filename: "framed-image.jpg".to_string(),
            video_filename: "framed-video.mp4".to_string(),
            save_directory: save_dir.to_string_lossy().to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self { refresh_hz: 60 }
    }
}
