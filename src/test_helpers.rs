//! Shared test utilities for the simple-mosaic test suite.
//!
//! Fixture rasters plus block assertions that compute expectations
//! independently of the production averaging code.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = distinct_raster(5, 5);
//! let block = Region::new(3, 3, 2, 2);
//! assert_uniform(&out, block);
//! assert_eq!(out.pixel(3, 3).unwrap(), region_mean(&src, block));
//! ```

use crate::raster::{CHANNELS, Raster, Region};

// =========================================================================
// Fixture rasters
// =========================================================================

/// A `width` x `height` raster whose pixels differ from their neighbours.
///
/// Red grows by 40 per column and 7 per row (wrapping), so every pixel of a
/// raster up to 6x6 has a unique red value. Alpha is opaque.
pub fn distinct_raster(width: u32, height: u32) -> Raster {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * CHANNELS);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[
                ((x * 40 + y * 7) % 256) as u8,
                ((y * 40 + x * 3) % 256) as u8,
                ((x * 13 + y * 29 + 5) % 256) as u8,
                255,
            ]);
        }
    }
    Raster::new(pixels, width, height).unwrap()
}

/// Two rasters that share dimensions but no pixel values.
pub fn contrasting_pair(width: u32, height: u32) -> (Raster, Raster) {
    (
        Raster::filled(width, height, [10, 20, 30, 255]).unwrap(),
        Raster::filled(width, height, [200, 180, 160, 128]).unwrap(),
    )
}

// =========================================================================
// Block assertions (panic with the offending coordinates)
// =========================================================================

/// Per-channel mean over `region`, rounded half up, computed in floating
/// point.
pub fn region_mean(raster: &Raster, region: Region) -> [u8; CHANNELS] {
    let mut sums = [0f64; CHANNELS];
    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            let px = raster
                .pixel(x, y)
                .unwrap_or_else(|| panic!("({x}, {y}) outside raster"));
            for (sum, c) in sums.iter_mut().zip(px) {
                *sum += f64::from(c);
            }
        }
    }
    let n = region.pixel_count() as f64;
    sums.map(|s| (s / n + 0.5).floor() as u8)
}

/// Assert every pixel in `region` has the same value.
pub fn assert_uniform(raster: &Raster, region: Region) {
    let first = raster
        .pixel(region.x, region.y)
        .unwrap_or_else(|| panic!("region {region} starts outside raster"));
    for y in region.y..region.y + region.height {
        for x in region.x..region.x + region.width {
            assert_eq!(
                raster.pixel(x, y),
                Some(first),
                "pixel ({x}, {y}) differs inside block {region}"
            );
        }
    }
}
