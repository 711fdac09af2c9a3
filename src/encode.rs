//! Final image encoding with codec fallback

use std::fmt;
use std::str::FromStr;

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lossy quality used for JPEG output (0-100)
pub const JPEG_QUALITY: u8 = 92;
/// Lossy quality used for HEIC output (0-100)
pub const HEIC_QUALITY: u8 = 90;

/// Output container format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpeg,
    Heic,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Heic];

    pub fn display_name(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Jpeg => "JPEG",
            ExportFormat::Heic => "HEIC",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Heic => "heic",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Heic => "image/heic",
        }
    }

    /// Quality for lossy formats; `None` means lossless.
    pub fn lossy_quality(&self) -> Option<u8> {
        match self {
            ExportFormat::Png => None,
            ExportFormat::Jpeg => Some(JPEG_QUALITY),
            ExportFormat::Heic => Some(HEIC_QUALITY),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "heic" | "heif" => Ok(ExportFormat::Heic),
            other => Err(Error::Config(format!("unknown export format: {}", other))),
        }
    }
}

/// Pick the format that will actually be written.
///
/// HEIC falls back to JPEG when the codec set cannot write it; every other
/// request is honoured as-is.
pub fn resolve_format(preferred: ExportFormat, heic_supported: bool) -> ExportFormat {
    if preferred == ExportFormat::Heic && !heic_supported {
        return ExportFormat::Jpeg;
    }
    preferred
}

/// Whether the bundled codec set can write HEIC. It has no HEIF writer.
pub fn supports_heic() -> bool {
    false
}

/// Encoded bytes and the format they are in
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
}

/// Serializes a canvas in the requested format, with fallback.
#[derive(Debug, Clone)]
pub struct ImageFormatEncoder {
    heic_supported: bool,
}

impl Default for ImageFormatEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFormatEncoder {
    pub fn new() -> Self {
        Self {
            heic_supported: supports_heic(),
        }
    }

    /// Override codec detection, e.g. to exercise fallback paths.
    pub fn with_heic_support(heic_supported: bool) -> Self {
        Self { heic_supported }
    }

    pub fn heic_supported(&self) -> bool {
        self.heic_supported
    }

    pub fn resolve(&self, preferred: ExportFormat) -> ExportFormat {
        resolve_format(preferred, self.heic_supported)
    }

    /// Encode `canvas`, returning the bytes and the format actually used.
    pub fn encode(&self, canvas: &RgbaImage, preferred: ExportFormat) -> Result<EncodedImage> {
        let format = self.resolve(preferred);
        if format != preferred {
            log::info!("{} is not supported here, encoding as {}", preferred, format);
        }

        let (width, height) = canvas.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::EncodingFailed);
        }

        let mut bytes = Vec::new();
        match format {
            ExportFormat::Png => {
                PngEncoder::new(&mut bytes).write_image(
                    canvas.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgba8,
                )?;
            }
            ExportFormat::Jpeg => {
                // JPEG has no alpha channel.
                let rgb: RgbImage = canvas.convert();
                JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )?;
            }
            ExportFormat::Heic => {
                log::warn!("HEIC requested with no HEIC writer available");
                return Err(Error::EncodingFailed);
            }
        }

        log::debug!("encoded {}x{} canvas as {} ({} bytes)", width, height, format, bytes.len());
        Ok(EncodedImage { bytes, format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn heic_falls_back_to_jpeg_when_unavailable() {
        assert_eq!(resolve_format(ExportFormat::Heic, false), ExportFormat::Jpeg);
    }

    #[test]
    fn heic_stays_heic_when_available() {
        assert_eq!(resolve_format(ExportFormat::Heic, true), ExportFormat::Heic);
    }

    #[test]
    fn other_formats_are_unchanged() {
        for supported in [true, false] {
            assert_eq!(resolve_format(ExportFormat::Png, supported), ExportFormat::Png);
            assert_eq!(resolve_format(ExportFormat::Jpeg, supported), ExportFormat::Jpeg);
        }
    }

    #[test]
    fn png_output_has_png_signature() {
        let canvas = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 255]));
        let out = ImageFormatEncoder::new().encode(&canvas, ExportFormat::Png).unwrap();
        assert_eq!(out.format, ExportFormat::Png);
        assert_eq!(&out.bytes[0..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn heic_request_is_written_as_jpeg() {
        let canvas = RgbaImage::from_pixel(8, 4, Rgba([200, 200, 200, 255]));
        let out = ImageFormatEncoder::new().encode(&canvas, ExportFormat::Heic).unwrap();
        assert_eq!(out.format, ExportFormat::Jpeg);
        assert_eq!(&out.bytes[0..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn claimed_heic_support_without_writer_fails() {
        let canvas = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let encoder = ImageFormatEncoder::with_heic_support(true);
        assert!(matches!(
            encoder.encode(&canvas, ExportFormat::Heic),
            Err(Error::EncodingFailed)
        ));
    }

    #[test]
    fn empty_canvas_fails() {
        let canvas = RgbaImage::new(0, 0);
        assert!(matches!(
            ImageFormatEncoder::new().encode(&canvas, ExportFormat::Png),
            Err(Error::EncodingFailed)
        ));
    }

    #[test]
    fn format_names_and_parsing() {
        assert_eq!(ExportFormat::Jpeg.file_extension(), "jpg");
        assert_eq!(ExportFormat::Heic.to_string(), "HEIC");
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Png.lossy_quality(), None);
        assert_eq!(ExportFormat::Jpeg.lossy_quality(), Some(92));
    }
}
