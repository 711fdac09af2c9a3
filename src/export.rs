//! Export orchestration: capture, compose, encode, hand off

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::capture::TileSnapshotter;
use crate::config::ExportConfig;
use crate::encode::{ExportFormat, ImageFormatEncoder};
use crate::limits::ExportLimits;
use crate::progress::Progress;
use crate::readiness::ReadinessConfig;
use crate::renderer::{ContentRenderer, OffscreenSurface};
use crate::sink::ImageSink;
use crate::{Error, Result};

/// Progress reported once the canvas is ready to encode
pub const PROGRESS_ENCODING: f64 = 0.98;

/// Where an export reads its content from.
pub enum ExportSource<'a, R: ContentRenderer> {
    /// The renderer currently on screen, if there is one.
    Live(Option<&'a mut R>),
    /// A temporary off-screen renderer owned by the export and torn down
    /// when it finishes.
    Background(R),
}

/// A finished export
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub requested_format: ExportFormat,
    pub format_used: ExportFormat,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

impl ExportOutput {
    /// Whether the codec set forced a different format than requested.
    pub fn fell_back(&self) -> bool {
        self.format_used != self.requested_format
    }

    /// Hex SHA-256 of the encoded bytes.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    /// Hand the encoded image to `sink`; sink errors come back unchanged.
    pub async fn save_to<S: ImageSink>(&self, sink: &mut S) -> Result<()> {
        sink.save(&self.file_name, &self.bytes).await?;
        Ok(())
    }
}

/// Produces one long image from a renderer.
#[derive(Debug, Clone)]
pub struct ImageExportService {
    snapshotter: TileSnapshotter,
    encoder: ImageFormatEncoder,
}

impl Default for ImageExportService {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

impl ImageExportService {
    pub fn new(limits: ExportLimits) -> Self {
        Self::with_parts(limits, ReadinessConfig::default(), ImageFormatEncoder::new())
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::with_parts(config.limits, config.readiness.clone(), ImageFormatEncoder::new())
    }

    pub fn with_parts(
        limits: ExportLimits,
        readiness: ReadinessConfig,
        encoder: ImageFormatEncoder,
    ) -> Self {
        Self {
            snapshotter: TileSnapshotter::new(limits, readiness),
            encoder,
        }
    }

    pub fn limits(&self) -> &ExportLimits {
        self.snapshotter.limits()
    }

    /// Capture the whole document behind `source` and encode it.
    ///
    /// Nothing partial is ever returned: any failure aborts the export. A
    /// background renderer is torn down on every exit path.
    pub async fn export_single_image<R: ContentRenderer>(
        &self,
        source: ExportSource<'_, R>,
        preferred: ExportFormat,
        progress: &mut Progress,
    ) -> Result<ExportOutput> {
        match source {
            ExportSource::Live(None) => Err(Error::MissingRenderer),
            ExportSource::Live(Some(renderer)) => {
                if renderer.is_loading() {
                    return Err(Error::PreviewStillRendering);
                }
                self.run(renderer, preferred, progress).await
            }
            ExportSource::Background(renderer) => {
                let mut surface = OffscreenSurface::new(renderer);
                self.run(&mut *surface, preferred, progress).await
            }
        }
    }

    async fn run<R: ContentRenderer>(
        &self,
        renderer: &mut R,
        preferred: ExportFormat,
        progress: &mut Progress,
    ) -> Result<ExportOutput> {
        log::info!("exporting as {} at width {}", preferred, self.limits().target_width);
        let canvas = self.snapshotter.snapshot_long_image(renderer, progress).await?;
        let (width, height) = canvas.dimensions();

        progress.report(PROGRESS_ENCODING);
        let encoded = self.encoder.encode(&canvas, preferred)?;
        drop(canvas);
        progress.report(1.0);

        Ok(ExportOutput {
            file_name: output_file_name(encoded.format),
            bytes: encoded.bytes,
            requested_format: preferred,
            format_used: encoded.format,
            width,
            height,
        })
    }
}

fn output_file_name(format: ExportFormat) -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("markdown-{:x}.{}", stamp, format.file_extension())
}
