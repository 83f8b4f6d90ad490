//! Edit session: one image, one selection, one restore point.
//!
//! # State Machine
//!
//! ```text
//!            load_image                  begin_select
//!  Empty ───────────────► Loaded ◄──────────────────────┐
//!    ▲                     │  ▲  ╲                      │
//!    │ clear_image         │  │   ╲ begin_select        │
//!    │ (from any state)    │  │    ▼                    │
//!    │          apply_mosaic  │  Selecting ◄──┐ drag_select
//!    │                     │  │    │  └───────┘         │
//!    │                     │  │    │ end_select         │
//!    │                     ▼  │    ▼                    │
//!    │                  Loaded ◄── Idle ────────────────┘
//!    │                        apply_mosaic / reset_selection
//! ```
//!
//! The state is derived from what the session holds, never stored
//! separately: no raster means `Empty`, a raster with a dragging selection
//! means `Selecting`, a retained selection means `Idle`, otherwise `Loaded`.
//!
//! # Commit and Restore
//!
//! Every successful [`EditSession::apply_mosaic`] commits: the snapshot is
//! refreshed and the selection cleared, so each edit becomes the new base
//! for the next one. A failed transform restores the working raster from
//! the snapshot before the error is returned, so callers never observe a
//! half-written region.

use crate::export::{
    ClipboardError, ClipboardSink, ExportError, ExportFormat, ExportNaming, ExportedImage, encode,
    export_raster,
};
use crate::mosaic::{
    AlphaMode, BlockAverageBackend, BlockSize, MosaicParams, MosaicPlan, PixelateBackend,
    TransformError, mosaic_region,
};
use crate::raster::{Raster, RasterBuffer, RasterError, Region};
use crate::selection::{Point, Selection};
use log::{debug, info, warn};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No image loaded")]
    NoImageLoaded,
    #[error(transparent)]
    InvalidDimensions(RasterError),
    #[error("Mosaic failed, image restored: {0}")]
    TransformFailure(#[from] TransformError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    #[error("Clipboard copy failed: {0}")]
    Clipboard(#[from] ClipboardError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loaded,
    Selecting,
    Idle,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Empty => "empty",
            SessionState::Loaded => "loaded",
            SessionState::Selecting => "selecting",
            SessionState::Idle => "idle",
        })
    }
}

/// What a successful [`EditSession::apply_mosaic`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicOutcome {
    pub plan: MosaicPlan,
    /// True when the selection was missing or degenerate and the whole
    /// image was used instead.
    pub full_image: bool,
}

/// Owns the raster, its snapshot and the selection for a single image.
pub struct EditSession<B = BlockAverageBackend> {
    buffer: RasterBuffer,
    selection: Selection,
    source_name: Option<String>,
    params: MosaicParams,
    naming: ExportNaming,
    backend: B,
}

impl EditSession<BlockAverageBackend> {
    pub fn new(params: MosaicParams) -> Self {
        Self::with_backend(BlockAverageBackend::new(), params)
    }
}

impl Default for EditSession<BlockAverageBackend> {
    fn default() -> Self {
        Self::new(MosaicParams::default())
    }
}

impl<B: PixelateBackend> EditSession<B> {
    pub fn with_backend(backend: B, params: MosaicParams) -> Self {
        Self {
            buffer: RasterBuffer::new(),
            selection: Selection::new(),
            source_name: None,
            params,
            naming: ExportNaming::default(),
            backend,
        }
    }

    pub fn with_naming(mut self, naming: ExportNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn state(&self) -> SessionState {
        if !self.buffer.is_loaded() {
            SessionState::Empty
        } else if self.selection.is_dragging() {
            SessionState::Selecting
        } else if self.selection.is_active() {
            SessionState::Idle
        } else {
            SessionState::Loaded
        }
    }

    // =========================================================================
    // Image lifecycle
    // =========================================================================

    /// Replace the current image. Selection, snapshot and source name from
    /// any previous image are discarded.
    pub fn load_image(&mut self, raster: Raster, source_name: Option<&str>) {
        info!(
            "loaded {}x{} image{}",
            raster.width(),
            raster.height(),
            source_name.map(|n| format!(" from {n}")).unwrap_or_default()
        );
        self.buffer.load_raster(raster);
        self.selection.clear();
        self.source_name = source_name.map(str::to_string);
    }

    /// Validate raw RGBA8 data and load it. On error the session is
    /// unchanged.
    pub fn load_pixels(
        &mut self,
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        source_name: Option<&str>,
    ) -> Result<(), SessionError> {
        let raster =
            Raster::new(pixels, width, height).map_err(SessionError::InvalidDimensions)?;
        self.load_image(raster, source_name);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        debug!("clearing image");
        self.buffer.clear();
        self.selection.clear();
        self.source_name = None;
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Start a drag at `point`. Ignored when no image is loaded.
    pub fn begin_select(&mut self, point: Point) {
        if !self.buffer.is_loaded() {
            debug!("begin_select ignored: no image");
            return;
        }
        self.selection.begin(point);
    }

    /// Move the end of the current drag. Ignored unless selecting.
    pub fn drag_select(&mut self, point: Point) {
        if self.state() == SessionState::Selecting {
            self.selection.update(point);
        }
    }

    pub fn end_select(&mut self) {
        if self.state() == SessionState::Selecting {
            self.selection.end_drag();
        }
    }

    /// Drop the selection and undo anything uncommitted. No-op without an
    /// active selection.
    pub fn reset_selection(&mut self) {
        if !self.selection.is_active() {
            return;
        }
        self.buffer.restore();
        self.selection.clear();
        debug!("selection reset");
    }

    // =========================================================================
    // Transform
    // =========================================================================

    /// Pixelate the selection, or the whole image when there is no usable
    /// selection, and commit the result.
    pub fn apply_mosaic(&mut self) -> Result<MosaicOutcome, SessionError> {
        let (width, height) = self
            .buffer
            .dimensions()
            .ok_or(SessionError::NoImageLoaded)?;
        self.buffer.restore();

        let (region, full_image) = match self.selection.clipped_region(width, height) {
            Ok(region) => (region, false),
            Err(reason) => {
                if self.selection.is_active() {
                    debug!("{reason}; using the whole image");
                }
                (Region::full(width, height), true)
            }
        };

        let raster = self
            .buffer
            .working_mut()
            .ok_or(SessionError::NoImageLoaded)?;
        match mosaic_region(&self.backend, raster, region, &self.params) {
            Ok(plan) => {
                self.buffer.commit();
                self.selection.clear();
                info!(
                    "mosaic applied to {} ({} blocks of {})",
                    plan.region,
                    plan.block_count(),
                    plan.block
                );
                Ok(MosaicOutcome { plan, full_image })
            }
            Err(err) => {
                self.buffer.restore();
                warn!("mosaic on {region} failed: {err}");
                Err(err.into())
            }
        }
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Encode the committed image under its suggested filename.
    pub fn export(&self) -> Result<ExportedImage, SessionError> {
        let raster = self.committed()?;
        Ok(export_raster(
            raster,
            self.source_name.as_deref(),
            &self.naming,
        )?)
    }

    /// Encode the committed image in an explicit format.
    pub fn export_as(&self, format: ExportFormat) -> Result<Vec<u8>, SessionError> {
        Ok(encode(self.committed()?, format)?)
    }

    pub fn copy_to_clipboard(&self, sink: &mut impl ClipboardSink) -> Result<(), SessionError> {
        let raster = self.committed()?;
        sink.set_image(raster)?;
        Ok(())
    }

    fn committed(&self) -> Result<&Raster, SessionError> {
        self.buffer.snapshot().ok_or(SessionError::NoImageLoaded)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The working raster.
    pub fn raster(&self) -> Option<&Raster> {
        self.buffer.working()
    }

    /// The last committed raster.
    pub fn snapshot(&self) -> Option<&Raster> {
        self.buffer.snapshot()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn params(&self) -> &MosaicParams {
        &self.params
    }

    pub fn set_block_size(&mut self, block: BlockSize) {
        self.params.block = block;
    }

    pub fn set_alpha_mode(&mut self, alpha: AlphaMode) {
        self.params.alpha = alpha;
    }
}
