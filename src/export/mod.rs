pub mod encoder;
pub mod params;
pub mod video;

use crate::config::ExportSettings;
use crate::error::{EditorError, EditorResult};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use video::{VideoExportError, VideoExportRequest};

/// Work captured from the editor under its lock, run without it.
#[derive(Debug, Clone)]
pub enum ExportJob {
    /// A freshly rendered canvas to flatten and save as JPEG.
    Image(RgbaImage),
    Video(VideoExportRequest),
}

impl ExportJob {
    pub fn is_video(&self) -> bool {
        matches!(self, ExportJob::Video(_))
    }
}

/// Carry out an export and return where the file landed.
pub async fn run(job: ExportJob, settings: &ExportSettings) -> EditorResult<PathBuf> {
    let dir = Path::new(&settings.save_directory);
    match job {
        ExportJob::Image(canvas) => {
            let quality = settings.jpeg_quality;
            let dir = dir.to_path_buf();
            let filename = settings.image_filename.clone();
            let result = tokio::task::spawn_blocking(move || {
                encoder::export_image(&canvas, quality, &dir, &filename)
            })
            .await
            .map_err(anyhow::Error::from)
            .and_then(|r| r);
            result.map_err(|e| {
                log::error!("Image export failed: {:#}", e);
                EditorError::Save(e)
            })
        }
        ExportJob::Video(request) => {
            let exporter = video::VideoExporter::new(
                settings.endpoint.clone(),
                Duration::from_secs(settings.timeout_secs),
            )
            .map_err(EditorError::VideoExport)?;
            exporter
                .export(&request, dir, &settings.video_filename)
                .await
                .map_err(|e| match e {
                    VideoExportError::Source { path, source } => {
                        log::warn!("Uploaded clip {} is gone: {}", path.display(), source);
                        EditorError::NotAVideo
                    }
                    VideoExportError::Server(e) => {
                        log::error!("Video export failed: {:#}", e);
                        EditorError::VideoExport(e)
                    }
                    VideoExportError::Save(e) => {
                        log::error!("Could not save exported video: {:#}", e);
                        EditorError::Save(e)
                    }
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::coords::CanvasSize;
    use crate::engine::transform::TransformState;
    use image::Rgba;

    fn settings(dir: &Path, endpoint: String) -> ExportSettings {
        ExportSettings {
            endpoint,
            jpeg_quality: 92,
            image_filename: "framed-image.jpg".to_string(),
            video_filename: "framed-video.mp4".to_string(),
            save_directory: dir.to_string_lossy().to_string(),
            timeout_secs: 10,
        }
    }

    #[tokio::test]
    async fn test_image_job_writes_jpeg() {
        let out = tempfile::tempdir().unwrap();
        let mut canvas = RgbaImage::new(20, 10);
        canvas.put_pixel(5, 5, Rgba([0, 0, 0, 255]));

        let path = run(ExportJob::Image(canvas), &settings(out.path(), String::new()))
            .await
            .unwrap();

        assert_eq!(path, out.path().join("framed-image.jpg"));
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (20, 10));
    }

    #[tokio::test]
    async fn test_server_failure_maps_to_user_message() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let clip = src.path().join("clip.mov");
        std::fs::write(&clip, b"mov").unwrap();
        let (url, _server) = video::test_server::respond_once(500, b"boom".to_vec()).await;

        let job = ExportJob::Video(VideoExportRequest {
            video_path: clip,
            file_name: "clip.mov".to_string(),
            mime: "video/quicktime".to_string(),
            params: params::VideoExportParams::new(
                &TransformState::default(),
                CanvasSize::new(1080, 1350),
                None,
            ),
        });
        let err = run(job, &settings(out.path(), url)).await.unwrap_err();

        assert_eq!(err.to_string(), "Video export failed on server.");
        assert!(!out.path().join("framed-video.mp4").exists());
    }

    #[tokio::test]
    async fn test_missing_clip_asks_for_a_video() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}/export", listener.local_addr().unwrap());

        let job = ExportJob::Video(VideoExportRequest {
            video_path: src.path().join("deleted.mp4"),
            file_name: "deleted.mp4".to_string(),
            mime: "video/mp4".to_string(),
            params: params::VideoExportParams::new(
                &TransformState::default(),
                CanvasSize::new(1080, 1350),
                None,
            ),
        });
        let err = run(job, &settings(out.path(), url)).await.unwrap_err();

        assert_eq!(err.to_string(), "Please upload a video first.");
        assert!(listener.accept().is_err());
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }
}
