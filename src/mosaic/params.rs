//! Parameter types for the mosaic transform.
//!
//! These describe *what* the transform should do; the
//! [`backend`](super::backend) decides *how*.
//!
//! - [`BlockSize`]: block edge length in pixels, clamped to 1–512 on construction.
//! - [`Preset`]: the four named sizes offered to users (5, 10, 25, 40).
//! - [`AlphaMode`]: whether the alpha channel is averaged or left alone.
//! - [`MosaicParams`]: the full set handed to a backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_BLOCK_SIZE: u32 = 1;
pub const MAX_BLOCK_SIZE: u32 = 512;

/// Edge length of one averaging block, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockSize(u32);

impl BlockSize {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(MIN_BLOCK_SIZE, MAX_BLOCK_SIZE))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Preset::default().block_size()
    }
}

impl From<Preset> for BlockSize {
    fn from(preset: Preset) -> Self {
        preset.block_size()
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Named block sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Small,
        Preset::Medium,
        Preset::Large,
        Preset::ExtraLarge,
    ];

    pub fn block_size(self) -> BlockSize {
        BlockSize::new(match self {
            Preset::Small => 5,
            Preset::Medium => 10,
            Preset::Large => 25,
            Preset::ExtraLarge => 40,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Small => "small",
            Preset::Medium => "medium",
            Preset::Large => "large",
            Preset::ExtraLarge => "extra-large",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// What happens to the alpha channel inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphaMode {
    /// Alpha is averaged like R, G and B.
    #[default]
    Average,
    /// Alpha keeps its per-pixel value; only R, G and B are averaged.
    Preserve,
}

impl AlphaMode {
    /// Number of leading channels the transform writes.
    pub fn channels_written(self) -> usize {
        match self {
            AlphaMode::Average => 4,
            AlphaMode::Preserve => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AlphaMode::Average => "average",
            AlphaMode::Preserve => "preserve",
        }
    }
}

impl fmt::Display for AlphaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlphaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "average" => Ok(AlphaMode::Average),
            "preserve" => Ok(AlphaMode::Preserve),
            other => Err(format!(
                "unknown alpha mode '{other}' (expected average or preserve)"
            )),
        }
    }
}

/// Everything a backend needs besides the pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MosaicParams {
    pub block: BlockSize,
    pub alpha: AlphaMode,
}
