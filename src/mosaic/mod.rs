//! Block pixelation ("mosaic") of raster regions.
//!
//! | Step | Where |
//! |---|---|
//! | Block grid and rounding | [`calculations`] (pure functions) |
//! | Block size, presets, alpha policy | [`params`] |
//! | Pixel work | [`PixelateBackend`] trait + [`BlockAverageBackend`] |
//! | Clip, copy, pixelate, write back | [`operations`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for block-grid math (unit testable)
//! - **Parameters**: Data structures describing a mosaic request
//! - **Backend**: [`PixelateBackend`] trait + [`BlockAverageBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod block_average;
pub mod calculations;
pub mod operations;
mod params;

pub use backend::{PixelateBackend, RegionPixels, TransformError};
pub use block_average::BlockAverageBackend;
pub use operations::{MosaicPlan, mosaic_full, mosaic_region, plan_mosaic};
pub use params::{AlphaMode, BlockSize, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, MosaicParams, Preset};
