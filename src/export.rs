//! Export of the committed raster: encoding, filename suggestion, clipboard.
//!
//! ## Filenames
//!
//! The suggested name keeps the source stem and extension and inserts a
//! suffix (default `_mosaicked`):
//!
//! ```text
//! holiday.jpg        → holiday_mosaicked.jpg
//! scan.final.TIFF    → scan.final_mosaicked.TIFF
//! diagram.gif        → diagram_mosaicked.png     (no encoder for gif)
//! (pasted, no name)  → mosaic-image.png
//! ```
//!
//! ## Formats
//!
//! | Extension | Encoder | Alpha |
//! |---|---|---|
//! | `png` | `image` PNG | kept |
//! | `jpg`, `jpeg` | `image` JPEG | dropped |
//! | `tif`, `tiff` | `image` TIFF | kept |
//! | `webp` | `image` WebP (lossless) | kept |

use crate::raster::Raster;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Encoding {format} failed: {source}")]
    Encode {
        format: ExportFormat,
        #[source]
        source: image::ImageError,
    },
    #[error("Raster buffer does not match its dimensions")]
    Buffer,
}

/// Clipboard failures are reported by the sink; this crate only carries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ClipboardError(pub String);

/// Destination for "copy image" requests (system clipboard, test double, ...).
pub trait ClipboardSink {
    fn set_image(&mut self, raster: &Raster) -> Result<(), ClipboardError>;
}

/// Output encodings with an encoder compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Tiff,
    WebP,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "tif" | "tiff" => Some(Self::Tiff),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Tiff => "tiff",
            Self::WebP => "webp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Tiff => ImageFormat::Tiff,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// How suggested filenames are built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNaming {
    pub suffix: String,
    pub default_name: String,
}

impl Default for ExportNaming {
    fn default() -> Self {
        Self {
            suffix: "_mosaicked".to_string(),
            default_name: "mosaic-image".to_string(),
        }
    }
}

/// An encoded image ready to be written or downloaded.
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Suggest a filename for the exported image and pick its format.
///
/// Only the final path component of `source` is used.
pub fn suggested_filename(source: Option<&str>, naming: &ExportNaming) -> (String, ExportFormat) {
    let path = source.map(Path::new);
    let stem = path
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty());
    let Some(stem) = stem else {
        let format = ExportFormat::default();
        return (
            format!("{}.{}", naming.default_name, format.extension()),
            format,
        );
    };

    let ext = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .and_then(|e| ExportFormat::from_extension(e).map(|f| (e, f)));
    match ext {
        Some((ext, format)) => (format!("{stem}{}.{ext}", naming.suffix), format),
        None => {
            let format = ExportFormat::default();
            (
                format!("{stem}{}.{}", naming.suffix, format.extension()),
                format,
            )
        }
    }
}

/// Encode `raster` in `format`.
pub fn encode(raster: &Raster, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let (width, height) = raster.dimensions();
    let rgba = RgbaImage::from_raw(width, height, raster.pixels().to_vec())
        .ok_or(ExportError::Buffer)?;
    let image = match format {
        ExportFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
        _ => DynamicImage::ImageRgba8(rgba),
    };

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format.image_format())
        .map_err(|source| ExportError::Encode { format, source })?;
    Ok(bytes)
}

/// Encode `raster` under its suggested filename.
pub fn export_raster(
    raster: &Raster,
    source: Option<&str>,
    naming: &ExportNaming,
) -> Result<ExportedImage, ExportError> {
    let (filename, format) = suggested_filename(source, naming);
    let bytes = encode(raster, format)?;
    Ok(ExportedImage {
        filename,
        format,
        bytes,
    })
}
