//! # Simple Mosaic
//!
//! Region-selective block pixelation for raster images. Pick a rectangle,
//! and every block inside it becomes the average color of the pixels it
//! covers. Typical use is redacting faces, plates and text before sharing a
//! screenshot or photo.
//!
//! # Architecture
//!
//! ```text
//! decode ──► EditSession ──────────────────────────────► export / clipboard
//!              │  load_image   RasterBuffer (working + snapshot)
//!              │  *_select     Selection (float points → pixel Region)
//!              └─ apply_mosaic ─► mosaic::mosaic_region ─► PixelateBackend
//! ```
//!
//! The core never touches a file or a screen: it works on RGBA8 buffers.
//! Decoding and encoding live at the edges ([`io`], [`export`]), and the CLI
//! in `main.rs` is one thin driver of [`session::EditSession`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`raster`] | RGBA8 [`raster::Raster`], [`raster::Region`], and the working/snapshot [`raster::RasterBuffer`] |
//! | [`selection`] | Drag rectangle, normalisation, clipping, display-to-raster mapping |
//! | [`mosaic`] | Block grid math, parameters, the [`mosaic::PixelateBackend`] trait and its block-averaging backend |
//! | [`session`] | Edit session state machine: load, select, apply, reset, export |
//! | [`export`] | Encoding, suggested filenames, clipboard seam |
//! | [`io`] | Decoding files and byte buffers into rasters |
//! | [`config`] | `mosaic.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Copy-On-Read Transforms
//!
//! A transform reads the region out of the raster, pixelates the copy and
//! writes it back only if every step succeeded. A failed transform therefore
//! leaves the raster exactly as it was, and the session additionally
//! restores from its snapshot before reporting the error.
//!
//! ## Blocks Anchored At The Selection
//!
//! The block grid starts at the selection's top-left corner, not the image
//! origin. Blocks on the right and bottom edges are truncated to what is
//! left and averaged over the pixels they actually contain, so no block ever
//! reads outside the selection.
//!
//! ## Every Edit Commits
//!
//! A successful mosaic immediately becomes the new restore point. Edits
//! compose: a second selection is pixelated on top of the first, and
//! "reset" only ever discards an uncommitted selection.

pub mod config;
pub mod export;
pub mod io;
pub mod mosaic;
pub mod output;
pub mod raster;
pub mod selection;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;
