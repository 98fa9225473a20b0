use thiserror::Error;

/// Failures the user gets to see. The `Display` text is the message shown
/// in the editor's status line.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Could not load the selected image.")]
    ImageDecode(#[source] image::ImageError),

    #[error("Please upload an image or video first.")]
    NoMedia,

    #[error("Please upload a video first.")]
    NotAVideo,

    #[error("Video export failed on server.")]
    VideoExport(#[source] anyhow::Error),

    #[error("Could not save the export.")]
    Save(#[source] anyhow::Error),
}

pub type EditorResult<T> = std::result::Result<T, EditorError>;
