//! Request and response types of the mosaic pipeline.

use bytes::Bytes;
use serde::Serialize;

use crate::arena::MAX_PALETTE_ENTRIES;
use crate::error::{MosaicError, SUCCESS_CODE};
use crate::quantize::DEFAULT_PALETTE_SIZE;

/// Default length, in tiles, of the longer side of a mosaic.
pub const DEFAULT_FIT: u32 = 50;

/// Default edge length of one tile in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 8;

// =============================================================================
// Options
// =============================================================================

/// How the decoded image is squared before tiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SquareMode {
    /// Keep the original aspect ratio
    #[default]
    None,
    /// Centred crop to the largest square with a side divisible by 8
    Crop,
    /// Letterbox into a grey square as large as the longer side
    Fit,
}

/// Parameters of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicOptions {
    /// Tiles along the longer side
    pub fit: u32,

    /// Tile edge lengths; one mosaic is produced per entry
    pub sizes: Vec<u32>,

    /// Derive a palette and encode against it
    pub quantize: bool,

    /// Number of palette entries when quantizing
    pub palette_size: usize,

    pub square: SquareMode,

    /// Reduce every colour sample to a multiple of this level
    pub posterize: Option<u8>,
}

impl Default for MosaicOptions {
    fn default() -> Self {
        Self {
            fit: DEFAULT_FIT,
            sizes: vec![DEFAULT_TILE_SIZE],
            quantize: false,
            palette_size: DEFAULT_PALETTE_SIZE,
            square: SquareMode::None,
            posterize: None,
        }
    }
}

impl MosaicOptions {
    /// Reject options no run could honor.
    pub fn validate(&self) -> Result<(), MosaicError> {
        if self.fit == 0 {
            return Err(MosaicError::invalid("fit", "must be greater than 0"));
        }
        if self.sizes.is_empty() {
            return Err(MosaicError::invalid("sizes", "at least one tile size is required"));
        }
        if self.sizes.contains(&0) {
            return Err(MosaicError::invalid("sizes", "tile sizes must be greater than 0"));
        }
        if self.quantize && !(1..=MAX_PALETTE_ENTRIES).contains(&self.palette_size) {
            return Err(MosaicError::invalid(
                "palette_size",
                format!(
                    "must be between 1 and {}, got {}",
                    MAX_PALETTE_ENTRIES, self.palette_size
                ),
            ));
        }
        if self.posterize == Some(0) {
            return Err(MosaicError::invalid("posterize", "must be greater than 0"));
        }
        Ok(())
    }
}

// =============================================================================
// Request
// =============================================================================

/// A request for the mosaic pipeline.
#[derive(Debug, Clone)]
pub struct MosaicRequest {
    /// The complete source image file
    pub file: Bytes,

    pub options: MosaicOptions,
}

impl MosaicRequest {
    /// Create a request with default options.
    pub fn new(file: impl Into<Bytes>) -> Self {
        Self::with_options(file, MosaicOptions::default())
    }

    pub fn with_options(file: impl Into<Bytes>, options: MosaicOptions) -> Self {
        Self {
            file: file.into(),
            options,
        }
    }
}

// =============================================================================
// Response
// =============================================================================

/// One encoded mosaic.
#[derive(Debug, Clone, Serialize)]
pub struct TileImage {
    /// File name, e.g. `mosaic-8.png`
    pub name: String,

    /// Tile edge length the mosaic was built with
    pub size: u32,

    pub width: u32,
    pub height: u32,

    /// Encoded length in bytes
    pub bytes: usize,

    /// Encoded file
    #[serde(skip)]
    pub data: Bytes,
}

/// Result envelope of a pipeline run.
///
/// Always well-formed: on failure `images` is empty and the dimensions are
/// zero.
#[derive(Debug, Clone, Serialize)]
pub struct MosaicResponse {
    /// 0 on success, otherwise [`MosaicError::code`]
    pub errno: u32,

    /// [`MosaicError::kind`] of the failure
    pub error: Option<&'static str>,

    pub message: String,

    pub elapsed_ms: u64,

    /// Dimensions of the raster that was tiled
    pub width: u32,
    pub height: u32,

    /// Request bytes clipped at admission
    pub overflow_read: usize,

    /// Bytes or palette entries clipped on write
    pub overflow_write: usize,

    pub images: Vec<TileImage>,
}

impl MosaicResponse {
    pub(crate) fn success(width: u32, height: u32, images: Vec<TileImage>) -> Self {
        Self {
            errno: SUCCESS_CODE,
            error: None,
            message: "ok".to_string(),
            elapsed_ms: 0,
            width,
            height,
            overflow_read: 0,
            overflow_write: 0,
            images,
        }
    }

    pub(crate) fn failure(err: &MosaicError) -> Self {
        Self {
            errno: err.code(),
            error: Some(err.kind()),
            message: err.to_string(),
            elapsed_ms: 0,
            width: 0,
            height: 0,
            overflow_read: 0,
            overflow_write: 0,
            images: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.errno == SUCCESS_CODE
    }
}
