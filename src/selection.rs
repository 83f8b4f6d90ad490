//! Drag-to-select rectangle model.
//!
//! A selection is kept as the two raw points of the drag gesture. Which
//! corner is the "start" is not known until the gesture ends, so the points
//! are normalized only when a rectangle is actually needed:
//!
//! ```text
//! start (7.6, 1.2) ─┐            x0 = floor(min x) = 2    x1 = ceil(max x) = 8
//!                   ├─► Bounds   y0 = floor(min y) = 1    y1 = ceil(max y) = 5
//! end   (2.3, 4.9) ─┘
//! ```
//!
//! Points arrive in raster coordinates. [`DisplayMapping`] converts pointer
//! positions on a scaled on-screen rendering into that space.

use crate::raster::Region;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("Degenerate selection: {width}x{height}")]
    Degenerate { width: i64, height: i64 },
    #[error("Selection has no area inside the {width}x{height} image")]
    OutsideImage { width: u32, height: u32 },
    #[error("Invalid display size: {width}x{height}")]
    InvalidDisplaySize { width: f64, height: f64 },
}

/// Real-valued position in raster space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Canonical integer rectangle, `x0 <= x1` and `y0 <= y1`. May extend past
/// the image; see [`Bounds::clip_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl Bounds {
    pub fn width(&self) -> i64 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> i64 {
        self.y1.saturating_sub(self.y0)
    }

    /// Clamp to `[0, width] x [0, height]`.
    pub fn clip_to(&self, width: u32, height: u32) -> Region {
        let clamp_x = |v: i64| v.clamp(0, i64::from(width)) as u32;
        let clamp_y = |v: i64| v.clamp(0, i64::from(height)) as u32;
        let (x0, x1) = (clamp_x(self.x0), clamp_x(self.x1));
        let (y0, y1) = (clamp_y(self.y0), clamp_y(self.y1));
        Region::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// Two-point selection plus drag status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    start: Option<Point>,
    end: Option<Point>,
    dragging: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new drag at `point`; any previous selection is replaced.
    pub fn begin(&mut self, point: Point) {
        self.start = Some(point);
        self.end = Some(point);
        self.dragging = true;
    }

    /// Move the end point. Ignored unless a selection is active.
    pub fn update(&mut self, point: Point) {
        if self.is_active() {
            self.end = Some(point);
        }
    }

    /// Stop dragging. The points stay.
    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    /// Floor the minimum corner, ceil the maximum corner.
    ///
    /// Zero-area results (including an inactive selection and non-finite
    /// coordinates) are [`SelectionError::Degenerate`].
    pub fn normalized_rect(&self) -> Result<Bounds, SelectionError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(SelectionError::Degenerate {
                width: 0,
                height: 0,
            });
        };
        let coords = [start.x, start.y, end.x, end.y];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(SelectionError::Degenerate {
                width: 0,
                height: 0,
            });
        }

        let bounds = Bounds {
            x0: start.x.min(end.x).floor() as i64,
            y0: start.y.min(end.y).floor() as i64,
            x1: start.x.max(end.x).ceil() as i64,
            y1: start.y.max(end.y).ceil() as i64,
        };
        if bounds.width() <= 0 || bounds.height() <= 0 {
            return Err(SelectionError::Degenerate {
                width: bounds.width(),
                height: bounds.height(),
            });
        }
        Ok(bounds)
    }

    /// The normalized rectangle clipped to a `width` x `height` image.
    pub fn clipped_region(&self, width: u32, height: u32) -> Result<Region, SelectionError> {
        let region = self.normalized_rect()?.clip_to(width, height);
        if region.is_empty() {
            return Err(SelectionError::OutsideImage { width, height });
        }
        Ok(region)
    }
}

/// Maps display (pointer) coordinates onto raster coordinates for an image
/// rendered at a different size than its pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    origin: Point,
    scale_x: f64,
    scale_y: f64,
}

impl DisplayMapping {
    /// `origin` is the top-left corner of the rendered image in display
    /// space; `displayed` is its rendered width and height.
    pub fn new(
        raster: (u32, u32),
        displayed: (f64, f64),
        origin: Point,
    ) -> Result<Self, SelectionError> {
        let (dw, dh) = displayed;
        if !(dw.is_finite() && dh.is_finite() && dw > 0.0 && dh > 0.0) {
            return Err(SelectionError::InvalidDisplaySize {
                width: dw,
                height: dh,
            });
        }
        Ok(Self {
            origin,
            scale_x: f64::from(raster.0) / dw,
            scale_y: f64::from(raster.1) / dh,
        })
    }

    pub fn to_raster(&self, display: Point) -> Point {
        Point::new(
            (display.x - self.origin.x) * self.scale_x,
            (display.y - self.origin.y) * self.scale_y,
        )
    }
}
