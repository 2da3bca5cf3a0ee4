//! Fixed upper bounds that size every arena.
//!
//! All arena memory is derived from these limits when a request is set up.
//! Nothing grows afterwards, so the limits are the worst case for one request.
//! Rasters built after decoding (the expanded mosaics) are held to the same
//! dimension and pixel bounds through [`Limits::check_raster`].

use crate::error::MosaicError;

/// Default maximum size of the request file (5 MB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5_000_000;

/// Default maximum size of one encoded output image (1 MB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1_000_000;

/// Default maximum width or height of a decoded image.
pub const DEFAULT_MAX_DIMENSION: u32 = 4096;

/// Default maximum pixel count of a decoded image (16 megapixels).
pub const DEFAULT_MAX_PIXELS: usize = 16 * 1024 * 1024;

/// Default and maximum number of palette entries.
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Decoded rasters are always expanded to 8-bit RGB.
pub const RGB_CHANNELS: u8 = 3;

/// Request-wide limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of the request file in bytes
    pub max_input_bytes: usize,

    /// Maximum size of one encoded output image in bytes
    pub max_output_bytes: usize,

    /// Maximum width or height of the decoded image
    pub max_dimension: u32,

    /// Maximum number of pixels in the decoded image
    pub max_pixels: usize,

    /// Maximum number of palette entries
    pub max_palette_entries: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_pixels: DEFAULT_MAX_PIXELS,
            max_palette_entries: MAX_PALETTE_ENTRIES,
        }
    }
}

impl Limits {
    /// Capacity of the arena that holds the request file and its decoded pixels.
    pub fn source_capacity(&self) -> ArenaCapacity {
        ArenaCapacity {
            file_bytes: self.max_input_bytes,
            pixel_bytes: self.max_pixels.saturating_mul(RGB_CHANNELS as usize),
            palette_entries: self.max_palette_entries,
            max_dimension: self.max_dimension,
        }
    }

    /// Capacity of the arena that receives encoded output.
    pub fn output_capacity(&self) -> ArenaCapacity {
        ArenaCapacity {
            file_bytes: self.max_output_bytes,
            pixel_bytes: 0,
            palette_entries: 0,
            max_dimension: self.max_dimension,
        }
    }

    /// Check a `width x height` raster against `max_dimension` and
    /// `max_pixels` before it is allocated.
    pub fn check_raster(&self, width: u32, height: u32, channels: u8) -> Result<(), MosaicError> {
        let exceeded = |reason: String| MosaicError::DimensionLimitExceeded {
            width,
            height,
            channels,
            reason,
        };

        if width > self.max_dimension || height > self.max_dimension {
            return Err(exceeded(format!(
                "the maximum dimension of {}",
                self.max_dimension
            )));
        }

        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels as u64 {
            return Err(exceeded(format!("the limit of {} pixels", self.max_pixels)));
        }

        Ok(())
    }
}

/// Fixed capacities of a single [`RasterArena`](super::RasterArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaCapacity {
    pub file_bytes: usize,
    pub pixel_bytes: usize,
    pub palette_entries: usize,
    pub max_dimension: u32,
}
