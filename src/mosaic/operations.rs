//! High-level mosaic operations.
//!
//! These functions tie region bookkeeping to a backend: clip the requested
//! region, copy it out, hand the copy to the backend, and write it back only
//! when the backend succeeded.

use super::backend::{PixelateBackend, RegionPixels, TransformError};
use super::calculations::{grid_dimensions, remainder_block};
use super::params::{BlockSize, MosaicParams};
use crate::raster::{Raster, Region};
use log::debug;

/// Result type for mosaic operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Block layout for one region, computed without touching pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicPlan {
    pub region: Region,
    pub block: BlockSize,
    /// Blocks per axis (columns, rows).
    pub grid: (u32, u32),
    /// Width of the truncated right-hand column, if any.
    pub partial_width: Option<u32>,
    /// Height of the truncated bottom row, if any.
    pub partial_height: Option<u32>,
}

impl MosaicPlan {
    pub fn block_count(&self) -> u64 {
        u64::from(self.grid.0) * u64::from(self.grid.1)
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }
}

/// Plan a mosaic over `region` of a `width` x `height` raster.
pub fn plan_mosaic(dimensions: (u32, u32), region: Region, block: BlockSize) -> MosaicPlan {
    let region = region.clip_to(dimensions.0, dimensions.1);
    let size = block.value();
    MosaicPlan {
        region,
        block,
        grid: grid_dimensions((region.width, region.height), size),
        partial_width: remainder_block(region.width, size),
        partial_height: remainder_block(region.height, size),
    }
}

/// Pixelate `region` of `raster` in place.
///
/// The region is clipped to the raster first; an empty region is a no-op
/// and returns an empty plan. On any error the raster is unchanged.
pub fn mosaic_region(
    backend: &impl PixelateBackend,
    raster: &mut Raster,
    region: Region,
    params: &MosaicParams,
) -> Result<MosaicPlan> {
    let plan = plan_mosaic(raster.dimensions(), region, params.block);
    if plan.is_empty() {
        debug!("mosaic skipped: region {region} has no pixels inside the raster");
        return Ok(plan);
    }

    let region = plan.region;
    let mut copy = raster
        .try_read(region)
        .map_err(|_| TransformError::Allocation {
            region,
            bytes: region.byte_len(),
        })?;
    backend.pixelate(
        RegionPixels::new(region.width, region.height, &mut copy)?,
        params,
    )?;
    raster.write(region, &copy)?;

    debug!(
        "mosaic {region}: {}x{} blocks of {}",
        plan.grid.0, plan.grid.1, plan.block
    );
    Ok(plan)
}

/// Pixelate the whole raster.
pub fn mosaic_full(
    backend: &impl PixelateBackend,
    raster: &mut Raster,
    params: &MosaicParams,
) -> Result<MosaicPlan> {
    let bounds = raster.bounds();
    mosaic_region(backend, raster, bounds, params)
}
