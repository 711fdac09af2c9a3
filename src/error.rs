//! Error types for the capture-and-compose pipeline

use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort an export.
///
/// The `Display` text of each variant is the user-facing message; callers are
/// expected to surface it as-is and let the user retry once the underlying
/// condition has changed.
#[derive(Error, Debug)]
pub enum Error {
    /// No live renderer was available to export from
    #[error("Preview is not ready yet. Please wait and try again.")]
    MissingRenderer,

    /// Export was requested before the renderer finished its first layout
    #[error("Preview is still rendering. Please wait a moment and try export again.")]
    PreviewStillRendering,

    /// The document size could not be measured (zero or negative)
    #[error("Unable to measure rendered content for export.")]
    UnableToMeasureContent,

    /// Layout never settled, or changed while tiles were being captured
    #[error("Content layout is still changing. Please wait and try export again.")]
    UnstableContentLayout,

    /// The document would exceed the pixel budget at the target width
    #[error("Content is too long for safe single-image export. Try shortening the markdown.")]
    ContentExceedsLimit,

    /// A tile never became stable, or came back with the wrong shape
    #[error("Export capture was incomplete. Please retry after preview settles.")]
    IncompleteTileCapture,

    /// The captured tiles do not cover the whole canvas
    #[error("Export image was incomplete. Please retry export.")]
    IncompleteComposedImage,

    /// The renderer produced no image for a region
    #[error("Failed to capture preview image.")]
    SnapshotFailed,

    /// The canvas could not be serialized in the chosen format
    #[error("Failed to encode image in the selected format.")]
    EncodingFailed,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Failure reported by the persistence sink, passed through unchanged
    #[error(transparent)]
    Sink(#[from] crate::sink::SinkError),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        log::warn!("codec error: {}", err);
        Error::EncodingFailed
    }
}
