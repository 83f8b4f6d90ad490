//! Decoding at the ingestion edge.
//!
//! Anything the `image` crate can read with the compiled-in codecs (PNG,
//! JPEG, TIFF, WebP) is converted to an RGBA8 [`Raster`]. The format is
//! sniffed from content, not trusted from the extension, so a pasted blob
//! and a mislabelled file both decode.

use crate::raster::{Raster, RasterError};
use image::{DynamicImage, ImageReader};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {name}: {source}")]
    Image {
        name: String,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Decode an image file.
pub fn decode_file(path: &Path) -> Result<Raster, DecodeError> {
    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|source| DecodeError::Image {
            name: path.display().to_string(),
            source,
        })?;
    to_raster(image)
}

/// Decode an in-memory image (clipboard paste, upload body).
pub fn decode_bytes(bytes: &[u8]) -> Result<Raster, DecodeError> {
    let image = image::load_from_memory(bytes).map_err(|source| DecodeError::Image {
        name: format!("{} byte buffer", bytes.len()),
        source,
    })?;
    to_raster(image)
}

fn to_raster(image: DynamicImage) -> Result<Raster, DecodeError> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(Raster::new(rgba.into_raw(), width, height)?)
}
