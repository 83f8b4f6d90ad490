//! Raster storage and the single-step restore point.
//!
//! A [`Raster`] is a fixed-size RGBA8 pixel grid. A [`RasterBuffer`] pairs a
//! working raster with a snapshot of the last committed state:
//!
//! ```text
//! load ──► working == snapshot
//!            │ mutate working (mosaic)
//!            ├── commit  ──► snapshot := working
//!            └── restore ──► working  := snapshot
//! ```
//!
//! Reads are copy-on-read: [`Raster::read`] hands out an owned copy of a
//! clipped region, and [`Raster::write`] validates the full write before it
//! touches a single byte, so a rejected write leaves the raster untouched.

use std::collections::TryReserveError;
use std::fmt;
use thiserror::Error;

/// Channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("Invalid dimensions: {width}x{height} with {len} bytes of pixel data")]
    InvalidDimensions { width: u32, height: u32, len: usize },
    #[error("Region {region} needs {expected} bytes, got {len}")]
    RegionSizeMismatch {
        region: Region,
        expected: usize,
        len: usize,
    },
}

/// Integer pixel rectangle in raster space.
///
/// A region with zero width or height is empty; operations over an empty
/// region are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole of a `width` x `height` raster.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn byte_len(&self) -> usize {
        self.pixel_count() * CHANNELS
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && u64::from(x) < self.right() && u64::from(y) < self.bottom()
    }

    /// Intersection with a `width` x `height` raster. Never fails; the
    /// result is empty when nothing overlaps.
    pub fn clip_to(&self, width: u32, height: u32) -> Region {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.right().min(u64::from(width)) as u32;
        let y1 = self.bottom().min(u64::from(height)) as u32;
        Region::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Fixed-size RGBA8 pixel grid, row-major, tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Wrap raw RGBA8 data. Both dimensions must be non-zero and the data
    /// must hold exactly `width * height * 4` bytes.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, RasterError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS));
        match expected {
            Some(len) if width > 0 && height > 0 && len == pixels.len() => Ok(Self {
                width,
                height,
                pixels,
            }),
            _ => Err(RasterError::InvalidDimensions {
                width,
                height,
                len: pixels.len(),
            }),
        }
    }

    /// A raster where every pixel is `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; CHANNELS]) -> Result<Self, RasterError> {
        let invalid = RasterError::InvalidDimensions {
            width,
            height,
            len: 0,
        };
        let Some(len) = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(CHANNELS))
        else {
            return Err(invalid);
        };
        let mut pixels = Vec::new();
        if pixels.try_reserve_exact(len).is_err() {
            return Err(invalid);
        }
        pixels.extend(rgba.iter().copied().cycle().take(len));
        Self::new(pixels, width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> Region {
        Region::full(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    fn row_bytes(&self) -> usize {
        self.width as usize * CHANNELS
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.row_bytes() + x as usize * CHANNELS
    }

    /// RGBA at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; CHANNELS]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        let mut px = [0u8; CHANNELS];
        px.copy_from_slice(&self.pixels[i..i + CHANNELS]);
        Some(px)
    }

    pub fn clip(&self, region: Region) -> Region {
        region.clip_to(self.width, self.height)
    }

    /// Copy out the clipped `region`. An empty intersection yields an empty
    /// vector.
    pub fn read(&self, region: Region) -> Vec<u8> {
        let mut out = Vec::new();
        self.read_into(self.clip(region), &mut out);
        out
    }

    /// Like [`read`](Self::read), but reports allocation failure instead of
    /// aborting. Large selections on large images go through here.
    pub fn try_read(&self, region: Region) -> Result<Vec<u8>, TryReserveError> {
        let region = self.clip(region);
        let mut out = Vec::new();
        out.try_reserve_exact(region.byte_len())?;
        self.read_into(region, &mut out);
        Ok(out)
    }

    fn read_into(&self, region: Region, out: &mut Vec<u8>) {
        if region.is_empty() {
            return;
        }
        let span = region.width as usize * CHANNELS;
        for y in region.y..region.y + region.height {
            let start = self.offset(region.x, y);
            out.extend_from_slice(&self.pixels[start..start + span]);
        }
    }

    /// Write tightly packed `data` into the clipped `region`.
    ///
    /// The length is checked against the clipped region before anything is
    /// written.
    pub fn write(&mut self, region: Region, data: &[u8]) -> Result<(), RasterError> {
        let region = self.clip(region);
        if data.len() != region.byte_len() {
            return Err(RasterError::RegionSizeMismatch {
                region,
                expected: region.byte_len(),
                len: data.len(),
            });
        }
        if region.is_empty() {
            return Ok(());
        }
        let span = region.width as usize * CHANNELS;
        for (row, src) in data.chunks_exact(span).enumerate() {
            let start = self.offset(region.x, region.y + row as u32);
            self.pixels[start..start + span].copy_from_slice(src);
        }
        Ok(())
    }
}

/// Working raster plus the snapshot it can be restored to.
///
/// Both halves are present exactly when an image is loaded.
#[derive(Debug, Clone, Default)]
pub struct RasterBuffer {
    working: Option<Raster>,
    snapshot: Option<Raster>,
}

impl RasterBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and load raw pixels, replacing both the working raster and
    /// the snapshot. On error nothing changes.
    pub fn load(&mut self, pixels: Vec<u8>, width: u32, height: u32) -> Result<(), RasterError> {
        let raster = Raster::new(pixels, width, height)?;
        self.load_raster(raster);
        Ok(())
    }

    pub fn load_raster(&mut self, raster: Raster) {
        self.snapshot = Some(raster.clone());
        self.working = Some(raster);
    }

    /// Working raster := snapshot. Idempotent; no-op when empty.
    pub fn restore(&mut self) {
        self.working.clone_from(&self.snapshot);
    }

    /// Snapshot := working raster.
    pub fn commit(&mut self) {
        self.snapshot.clone_from(&self.working);
    }

    pub fn clear(&mut self) {
        self.working = None;
        self.snapshot = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.working.is_some()
    }

    /// True when the working raster has uncommitted changes.
    pub fn is_dirty(&self) -> bool {
        self.working != self.snapshot
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.working.as_ref().map(Raster::dimensions)
    }

    /// Copy of the clipped region of the working raster; empty when nothing
    /// is loaded or the region misses the raster.
    pub fn read(&self, region: Region) -> Vec<u8> {
        self.working
            .as_ref()
            .map(|r| r.read(region))
            .unwrap_or_default()
    }

    pub fn working(&self) -> Option<&Raster> {
        self.working.as_ref()
    }

    pub fn working_mut(&mut self) -> Option<&mut Raster> {
        self.working.as_mut()
    }

    pub fn snapshot(&self) -> Option<&Raster> {
        self.snapshot.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::distinct_raster;

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(matches!(
            Raster::new(Vec::new(), 0, 3),
            Err(RasterError::InvalidDimensions { width: 0, .. })
        ));
        assert!(Raster::new(Vec::new(), 3, 0).is_err());
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = Raster::new(vec![0; 15], 2, 2).unwrap_err();
        assert_eq!(
            err,
            RasterError::InvalidDimensions {
                width: 2,
                height: 2,
                len: 15
            }
        );
    }

    #[test]
    fn filled_sets_every_pixel() {
        let r = Raster::filled(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(r.pixels().len(), 24);
        assert_eq!(r.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(r.pixel(3, 0), None);
    }

    #[test]
    fn filled_rejects_overflowing_dimensions() {
        let err = Raster::filled(u32::MAX, u32::MAX, [0; 4]).unwrap_err();
        assert_eq!(
            err,
            RasterError::InvalidDimensions {
                width: u32::MAX,
                height: u32::MAX,
                len: 0
            }
        );
        assert!(Raster::filled(0, 5, [0; 4]).is_err());
    }

    #[test]
    fn clip_partially_outside() {
        let region = Region::new(3, 1, 10, 10).clip_to(5, 4);
        assert_eq!(region, Region::new(3, 1, 2, 3));
    }

    #[test]
    fn clip_fully_outside_is_empty() {
        assert!(Region::new(8, 0, 2, 2).clip_to(5, 5).is_empty());
        assert!(Region::new(0, 5, 2, 2).clip_to(5, 5).is_empty());
    }

    #[test]
    fn clip_handles_u32_overflow() {
        let region = Region::new(u32::MAX - 1, 0, u32::MAX, 1).clip_to(5, 5);
        assert!(region.is_empty());
    }

    #[test]
    fn read_returns_rows_in_order() {
        let r = distinct_raster(4, 3);
        let data = r.read(Region::new(1, 1, 2, 2));
        assert_eq!(data.len(), 16);
        assert_eq!(&data[0..4], &r.pixel(1, 1).unwrap());
        assert_eq!(&data[4..8], &r.pixel(2, 1).unwrap());
        assert_eq!(&data[8..12], &r.pixel(1, 2).unwrap());
        assert_eq!(&data[12..16], &r.pixel(2, 2).unwrap());
    }

    #[test]
    fn read_empty_intersection_is_empty() {
        let r = distinct_raster(4, 4);
        assert!(r.read(Region::new(10, 10, 3, 3)).is_empty());
        assert!(r.read(Region::new(1, 1, 0, 3)).is_empty());
    }

    #[test]
    fn write_rejects_wrong_length_without_touching_pixels() {
        let mut r = distinct_raster(4, 4);
        let before = r.clone();
        let err = r.write(Region::new(0, 0, 2, 2), &[0; 12]).unwrap_err();
        assert!(matches!(err, RasterError::RegionSizeMismatch { expected: 16, len: 12, .. }));
        assert_eq!(r, before);
    }

    #[test]
    fn write_only_touches_region() {
        let mut r = distinct_raster(4, 4);
        let before = r.clone();
        r.write(Region::new(1, 2, 2, 1), &[9; 8]).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                if y == 2 && (1..3).contains(&x) {
                    assert_eq!(r.pixel(x, y), Some([9; 4]));
                } else {
                    assert_eq!(r.pixel(x, y), before.pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn buffer_restore_without_image_is_noop() {
        let mut buf = RasterBuffer::new();
        buf.restore();
        buf.commit();
        assert!(!buf.is_loaded());
        assert!(buf.snapshot().is_none());
        assert!(buf.read(Region::full(2, 2)).is_empty());
    }

    #[test]
    fn buffer_load_replaces_working_and_snapshot() {
        let mut buf = RasterBuffer::new();
        buf.load_raster(distinct_raster(3, 3));
        let fresh = distinct_raster(2, 1);
        buf.load(fresh.pixels().to_vec(), 2, 1).unwrap();
        assert_eq!(buf.dimensions(), Some((2, 1)));
        assert_eq!(buf.working(), Some(&fresh));
        assert_eq!(buf.snapshot(), Some(&fresh));
        assert!(!buf.is_dirty());
    }

    #[test]
    fn buffer_load_rejects_bad_data_and_keeps_state() {
        let mut buf = RasterBuffer::new();
        buf.load_raster(distinct_raster(2, 2));
        let err = buf.load(vec![0; 7], 2, 2).unwrap_err();
        assert!(matches!(err, RasterError::InvalidDimensions { .. }));
        assert_eq!(buf.working(), Some(&distinct_raster(2, 2)));
    }

    #[test]
    fn buffer_restore_and_commit() {
        let mut buf = RasterBuffer::new();
        buf.load_raster(distinct_raster(3, 3));
        let original = buf.working().unwrap().clone();

        buf.working_mut()
            .unwrap()
            .write(Region::new(0, 0, 1, 1), &[0; 4])
            .unwrap();
        assert!(buf.is_dirty());

        buf.restore();
        assert_eq!(buf.working(), Some(&original));
        buf.restore();
        assert_eq!(buf.working(), Some(&original));

        buf.working_mut()
            .unwrap()
            .write(Region::new(0, 0, 1, 1), &[0; 4])
            .unwrap();
        buf.commit();
        assert!(!buf.is_dirty());
        buf.restore();
        assert_eq!(buf.working().unwrap().pixel(0, 0), Some([0; 4]));
    }
}
