//! Direct block averaging.
//!
//! The region is cut into horizontal bands one block tall; every band is
//! independent, so bands go to rayon workers. Inside a band, each block's
//! channel sums are accumulated over its real pixels only and the rounded
//! mean is written back to every pixel of that block.
//!
//! ```text
//! 5x5, block 3     band 0 (3 rows)   band 1 (2 rows)
//!                  ┌─────┬───┐
//!                  │ 3x3 │2x3│
//!                  ├─────┼───┤
//!                  │ 3x2 │2x2│
//!                  └─────┴───┘
//! ```
//!
//! A block that is already uniform averages to itself, so running the
//! transform twice with the same block size over the same region changes
//! nothing the second time.

use super::backend::{PixelateBackend, RegionPixels, TransformError};
use super::calculations::{Span, block_spans, rounded_mean};
use super::params::{AlphaMode, MosaicParams};
use crate::raster::CHANNELS;
use rayon::prelude::*;

/// Block-averaging backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockAverageBackend;

impl BlockAverageBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PixelateBackend for BlockAverageBackend {
    fn pixelate(
        &self,
        pixels: RegionPixels<'_>,
        params: &MosaicParams,
    ) -> Result<(), TransformError> {
        let row_bytes = pixels.row_bytes();
        let RegionPixels { width, data, .. } = pixels;
        if data.is_empty() {
            return Ok(());
        }
        let block = params.block.value();
        let band_bytes = row_bytes * block as usize;

        data.par_chunks_mut(band_bytes)
            .for_each(|band| average_band(band, width, block, params.alpha));
        Ok(())
    }
}

/// Average every block of one band (1..=block rows) in place.
fn average_band(band: &mut [u8], width: u32, block: u32, alpha: AlphaMode) {
    let row_bytes = width as usize * CHANNELS;
    let rows = (band.len() / row_bytes) as u64;
    let written = alpha.channels_written();

    for span in block_spans(width, block) {
        let cols = byte_range(span);
        let mut sums = [0u64; CHANNELS];
        for row in band.chunks_exact(row_bytes) {
            for px in row[cols.clone()].chunks_exact(CHANNELS) {
                for (sum, &c) in sums.iter_mut().zip(px) {
                    *sum += u64::from(c);
                }
            }
        }

        let count = u64::from(span.len) * rows;
        let mean = sums.map(|sum| rounded_mean(sum, count));
        for row in band.chunks_exact_mut(row_bytes) {
            for px in row[cols.clone()].chunks_exact_mut(CHANNELS) {
                px[..written].copy_from_slice(&mean[..written]);
            }
        }
    }
}

fn byte_range(span: Span) -> std::ops::Range<usize> {
    span.start as usize * CHANNELS..span.end() as usize * CHANNELS
}
