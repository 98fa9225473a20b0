use super::params::VideoExportParams;
use anyhow::Context;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

/// Everything needed to ask the processing endpoint for a framed video.
#[derive(Debug, Clone)]
pub struct VideoExportRequest {
    pub video_path: PathBuf,
    pub file_name: String,
    pub mime: String,
    pub params: VideoExportParams,
}

/// Where a video export went wrong.
#[derive(Debug, Error)]
pub enum VideoExportError {
    /// The uploaded clip can no longer be read; nothing was sent.
    #[error("cannot read source clip {}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure or a non-2xx answer from the endpoint.
    #[error(transparent)]
    Server(anyhow::Error),

    /// The endpoint answered but the result could not be written.
    #[error(transparent)]
    Save(anyhow::Error),
}

/// Client for the external video processing endpoint.
pub struct VideoExporter {
    endpoint: String,
    client: reqwest::Client,
}

impl VideoExporter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("Frameup/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// POST the clip and its placement, save the returned file as
    /// `<dir>/<filename>`. No retries; nothing is written on failure.
    pub async fn export(
        &self,
        request: &VideoExportRequest,
        dir: &Path,
        filename: &str,
    ) -> Result<PathBuf, VideoExportError> {
        let source_error = |source| VideoExportError::Source {
            path: request.video_path.clone(),
            source,
        };
        let file = tokio::fs::File::open(&request.video_path)
            .await
            .map_err(source_error)?;
        let length = file.metadata().await.map_err(source_error)?.len();

        // The clip is streamed from disk, never held in memory
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let video_part = reqwest::multipart::Part::stream_with_length(body, length)
            .file_name(request.file_name.clone())
            .mime_str(&request.mime)
            .map_err(|e| VideoExportError::Server(e.into()))?;
        let params = serde_json::to_string(&request.params)
            .map_err(|e| VideoExportError::Server(e.into()))?;

        let form = reqwest::multipart::Form::new()
            .part("video", video_part)
            .text("params", params);

        log::info!("Posting {} ({} bytes) to {}", request.file_name, length, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("sending export request")
            .map_err(VideoExportError::Server)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VideoExportError::Server(anyhow::anyhow!(
                "Export endpoint returned {}: {}",
                status,
                error_text.trim()
            )));
        }

        let dir_owned = dir.to_path_buf();
        let tmp = blocking(move || {
            std::fs::create_dir_all(&dir_owned)
                .with_context(|| format!("creating export directory {}", dir_owned.display()))?;
            Ok(tempfile::NamedTempFile::new_in(&dir_owned)?)
        })
        .await
        .map_err(VideoExportError::Save)?;

        let mut out = tokio::fs::File::from_std(
            tmp.reopen()
                .context("opening temp file")
                .map_err(VideoExportError::Save)?,
        );
        let mut stream = response.bytes_stream();
        let mut total = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .context("reading export response")
                .map_err(VideoExportError::Server)?;
            total += chunk.len();
            out.write_all(&chunk)
                .await
                .context("writing export")
                .map_err(VideoExportError::Save)?;
        }
        out.flush()
            .await
            .context("writing export")
            .map_err(VideoExportError::Save)?;
        drop(out);

        let dest = dir.join(filename);
        let dest_owned = dest.clone();
        blocking(move || {
            tmp.persist(&dest_owned)
                .with_context(|| format!("saving {}", dest_owned.display()))?;
            Ok(())
        })
        .await
        .map_err(VideoExportError::Save)?;

        log::info!("Exported video to {} ({} bytes)", dest.display(), total);
        Ok(dest)
    }
}

async fn blocking<T, F>(f: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}


#[cfg(test)]
mod tests {
    use super::test_server::respond_once;
    use super::*;
    use crate::engine::coords::CanvasSize;
    use crate::engine::transform::TransformState;

    fn request(dir: &Path) -> VideoExportRequest {
        let video_path = dir.join("clip.mp4");
        std::fs::write(&video_path, b"fake video bytes").unwrap();
        VideoExportRequest {
            video_path,
            file_name: "clip.mp4".to_string(),
            mime: "video/mp4".to_string(),
            params: VideoExportParams::new(
                &TransformState { scale: 0.75, rotation_deg: 90.0, pos_x: 12.0, pos_y: -3.0 },
                CanvasSize::new(800, 600),
                Some("file:///frames/frame.png".to_string()),
            ),
        }
    }

    #[tokio::test]
    async fn test_successful_export_saves_body() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let (url, server) = respond_once(200, b"rendered mp4".to_vec()).await;

        let exporter = VideoExporter::new(url, Duration::from_secs(10)).unwrap();
        let path = exporter
            .export(&request(src.path()), out.path(), "framed-video.mp4")
            .await
            .unwrap();

        assert_eq!(path, out.path().join("framed-video.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"rendered mp4");

        let raw = String::from_utf8_lossy(&server.await.unwrap()).to_string();
        assert!(raw.starts_with("POST /export"));
        assert!(raw.contains("name=\"video\""));
        assert!(raw.contains("filename=\"clip.mp4\""));
        assert!(raw.contains("fake video bytes"));
        assert!(raw.contains("name=\"params\""));
        assert!(raw.contains("\"rotationDeg\":90.0"));
        assert!(raw.contains("\"frameUrl\":\"file:///frames/frame.png\""));
    }

    #[tokio::test]
    async fn test_server_error_writes_nothing() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let (url, _server) = respond_once(500, b"ffmpeg crashed".to_vec()).await;

        let exporter = VideoExporter::new(url, Duration::from_secs(10)).unwrap();
        let err = exporter
            .export(&request(src.path()), out.path(), "framed-video.mp4")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("500"), "{}", err);
        assert!(err.to_string().contains("ffmpeg crashed"), "{}", err);
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        // Bind then drop to get a port nobody listens on
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let exporter =
            VideoExporter::new(format!("http://127.0.0.1:{}/x", port), Duration::from_secs(5)).unwrap();
        let result = exporter
            .export(&request(src.path()), out.path(), "framed-video.mp4")
            .await;
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_clip_fails_before_sending() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let mut req = request(src.path());
        std::fs::remove_file(&req.video_path).unwrap();
        req.video_path = src.path().join("gone.mp4");

        // A listener that must never see a connection
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}/export", listener.local_addr().unwrap());

        let exporter = VideoExporter::new(url, Duration::from_secs(5)).unwrap();
        let err = exporter
            .export(&req, out.path(), "framed-video.mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, VideoExportError::Source { .. }), "{:?}", err);
        assert_eq!(
            listener.accept().unwrap_err().kind(),
            std::io::ErrorKind::WouldBlock
        );
    }

    #[tokio::test]
    async fn test_unwritable_destination_is_a_save_error() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let not_a_dir = out.path().join("occupied");
        std::fs::write(&not_a_dir, b"file").unwrap();
        let (url, _server) = respond_once(200, b"rendered mp4".to_vec()).await;

        let exporter = VideoExporter::new(url, Duration::from_secs(10)).unwrap();
        let err = exporter
            .export(&request(src.path()), &not_a_dir, "framed-video.mp4")
            .await
            .unwrap_err();

        assert!(matches!(err, VideoExportError::Save(_)), "{:?}", err);
    }
}
