//! Pure block-grid arithmetic.
//!
//! No pixels and no I/O here, so the boundary policy can be tested on its
//! own. Blocks are anchored at the region's top-left corner; the last block
//! on each axis is truncated to whatever is left:
//!
//! ```text
//! extent 7, block 3:   [0 1 2][3 4 5][6]
//!                       len 3  len 3  len 1
//! ```

/// One block's extent along a single axis, relative to the region origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub len: u32,
}

impl Span {
    pub fn end(&self) -> u32 {
        self.start + self.len
    }
}

/// Block spans covering `0..extent` with nominal size `block`.
///
/// A `block` of 0 is treated as 1.
pub fn block_spans(extent: u32, block: u32) -> impl Iterator<Item = Span> {
    let block = block.max(1);
    (0..extent).step_by(block as usize).map(move |start| Span {
        start,
        len: block.min(extent - start),
    })
}

/// Number of blocks per axis: `ceil(extent / block)`.
///
/// # Examples
/// ```
/// # use simple_mosaic::mosaic::calculations::grid_dimensions;
/// assert_eq!(grid_dimensions((5, 5), 3), (2, 2));
/// assert_eq!(grid_dimensions((10, 4), 5), (2, 1));
/// ```
pub fn grid_dimensions(extent: (u32, u32), block: u32) -> (u32, u32) {
    let block = block.max(1);
    (extent.0.div_ceil(block), extent.1.div_ceil(block))
}

/// Size of the truncated last block on one axis, or `None` when `block`
/// divides `extent` evenly.
pub fn remainder_block(extent: u32, block: u32) -> Option<u32> {
    let block = block.max(1);
    match extent % block {
        0 => None,
        r => Some(r),
    }
}

/// Integer mean of `sum` over `count` samples, rounded half up.
///
/// `count` of 0 yields 0.
pub fn rounded_mean(sum: u64, count: u64) -> u8 {
    if count == 0 {
        return 0;
    }
    ((sum + count / 2) / count).min(u64::from(u8::MAX)) as u8
}
