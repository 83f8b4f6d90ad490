//! Pixelation backend trait and shared types.
//!
//! The [`PixelateBackend`] trait is the seam between region bookkeeping
//! ([`operations`](super::operations)) and pixel work. A backend only ever
//! sees a private copy of the region, so whatever it does to that copy, the
//! raster is untouched until the backend returns `Ok`.
//!
//! The production implementation is
//! [`BlockAverageBackend`](super::block_average::BlockAverageBackend).

use super::params::MosaicParams;
use crate::raster::{CHANNELS, RasterError, Region};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Could not allocate {bytes} bytes to copy region {region}")]
    Allocation { region: Region, bytes: usize },
    #[error("Region buffer holds {len} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
    #[error("Write-back failed: {0}")]
    WriteBack(#[from] RasterError),
    #[error("Pixelation failed: {0}")]
    ProcessingFailed(String),
}

/// A tightly packed RGBA8 copy of one region, lent to a backend.
#[derive(Debug)]
pub struct RegionPixels<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a mut [u8],
}

impl<'a> RegionPixels<'a> {
    pub fn new(width: u32, height: u32, data: &'a mut [u8]) -> Result<Self, TransformError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(TransformError::BufferSize {
                width,
                height,
                len: data.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * CHANNELS
    }
}

/// Trait for pixelation backends.
///
/// `Sync` so a backend can be shared with rayon workers.
pub trait PixelateBackend: Sync {
    /// Pixelate `pixels` in place.
    fn pixelate(&self, pixels: RegionPixels<'_>, params: &MosaicParams)
    -> Result<(), TransformError>;
}
