//! Persistence sinks for finished exports

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures reported by a sink. Exports surface these unchanged.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Permission is required to save exports. Please allow access and try again.")]
    PermissionDenied,

    #[error("Failed to save image: {0}")]
    WriteFailed(#[source] std::io::Error),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            SinkError::PermissionDenied
        } else {
            SinkError::WriteFailed(err)
        }
    }
}

/// Accepts a finished, encoded image.
#[allow(async_fn_in_trait)]
pub trait ImageSink {
    async fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), SinkError>;
}

/// Writes exports into a directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    last_saved: Option<PathBuf>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last_saved: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the most recent successful save
    pub fn last_saved(&self) -> Option<&Path> {
        self.last_saved.as_deref()
    }
}

impl ImageSink for FileSink {
    async fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        log::info!("saved {} bytes to {}", bytes.len(), path.display());
        self.last_saved = Some(path);
        Ok(())
    }
}
