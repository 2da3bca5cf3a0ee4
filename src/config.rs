//! Configuration management for Pixel Mosaic.
//!
//! This module provides the command-line configuration of the binary:
//! - Command-line arguments via clap
//! - Environment variables with `MOSAIC_` prefix
//! - Defaults that mirror the library's built-in limits
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use pixel_mosaic::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//!
//! let service = MosaicService::with_limits(config.limits());
//! ```
//!
//! # Environment Variables
//!
//! - `MOSAIC_INPUT` - Source image path (default: stdin)
//! - `MOSAIC_OUTPUT_DIR` - Directory for the encoded mosaics (default: .)
//! - `MOSAIC_FIT` - Tiles along the longer side (default: 50)
//! - `MOSAIC_SIZES` - Comma-separated tile sizes in pixels (default: 8)
//! - `MOSAIC_QUANTIZE` - Encode against a derived palette (default: false)
//! - `MOSAIC_PALETTE_SIZE` - Palette entries (default: 256)
//! - `MOSAIC_SAMPLE_FACTOR` - NeuQuant sampling factor (default: 10)
//! - `MOSAIC_SQUARE` - none, crop or fit (default: none)
//! - `MOSAIC_POSTERIZE` - Posterize level (default: off)
//! - `MOSAIC_FORMAT` - png or jpeg (default: png)
//! - `MOSAIC_JPEG_QUALITY` - JPEG quality (default: 80)
//! - `MOSAIC_MAX_INPUT_BYTES` - Request file limit (default: 5000000)
//! - `MOSAIC_MAX_OUTPUT_BYTES` - Encoded output limit (default: 1000000)
//! - `MOSAIC_MAX_DIMENSION` - Largest decoded width or height (default: 4096)
//! - `MOSAIC_MAX_PIXELS` - Largest decoded pixel count (default: 16777216)

use std::path::PathBuf;

use clap::Parser;

use crate::arena::{
    Limits, DEFAULT_MAX_DIMENSION, DEFAULT_MAX_INPUT_BYTES, DEFAULT_MAX_OUTPUT_BYTES,
    DEFAULT_MAX_PIXELS, MAX_PALETTE_ENTRIES,
};
use crate::codec::{is_valid_quality, OutputFormat, DEFAULT_JPEG_QUALITY};
use crate::pipeline::{MosaicOptions, SquareMode, DEFAULT_FIT, DEFAULT_TILE_SIZE};
use crate::quantize::{DEFAULT_PALETTE_SIZE, DEFAULT_SAMPLE_FACTOR};

// =============================================================================
// Default Values
// =============================================================================

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Pixel Mosaic - Turn an image into tiled mosaics.
///
/// Reads a PNG or JPEG file, builds one mosaic per tile size and writes each
/// as `mosaic-<size>.<ext>`. A JSON summary is printed to stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "pixel-mosaic")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Input / Output
    // =========================================================================
    /// Source image. Read from stdin when omitted.
    #[arg(env = "MOSAIC_INPUT")]
    pub input: Option<PathBuf>,

    /// Directory the encoded mosaics are written to.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, env = "MOSAIC_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Png, env = "MOSAIC_FORMAT")]
    pub format: OutputFormat,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "MOSAIC_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    // =========================================================================
    // Mosaic
    // =========================================================================
    /// Number of tiles along the longer side.
    #[arg(long, default_value_t = DEFAULT_FIT, env = "MOSAIC_FIT")]
    pub fit: u32,

    /// Tile sizes in pixels (comma-separated); one mosaic per size.
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [DEFAULT_TILE_SIZE],
        env = "MOSAIC_SIZES"
    )]
    pub sizes: Vec<u32>,

    /// How to square the image before tiling.
    #[arg(long, value_enum, default_value_t = SquareMode::None, env = "MOSAIC_SQUARE")]
    pub square: SquareMode,

    /// Reduce every colour sample to a multiple of this level.
    #[arg(long, env = "MOSAIC_POSTERIZE")]
    pub posterize: Option<u8>,

    // =========================================================================
    // Quantization
    // =========================================================================
    /// Derive a palette and encode the mosaics against it.
    #[arg(long, default_value_t = false, env = "MOSAIC_QUANTIZE")]
    pub quantize: bool,

    /// Number of palette entries.
    #[arg(long, default_value_t = DEFAULT_PALETTE_SIZE, env = "MOSAIC_PALETTE_SIZE")]
    pub palette_size: usize,

    /// NeuQuant sampling factor (1 = best quality, 30 = fastest).
    #[arg(long, default_value_t = DEFAULT_SAMPLE_FACTOR, env = "MOSAIC_SAMPLE_FACTOR")]
    pub sample_factor: i32,

    // =========================================================================
    // Limits
    // =========================================================================
    /// Largest accepted input file in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_BYTES, env = "MOSAIC_MAX_INPUT_BYTES")]
    pub max_input_bytes: usize,

    /// Largest encoded mosaic in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_BYTES, env = "MOSAIC_MAX_OUTPUT_BYTES")]
    pub max_output_bytes: usize,

    /// Largest decoded width or height.
    #[arg(long, default_value_t = DEFAULT_MAX_DIMENSION, env = "MOSAIC_MAX_DIMENSION")]
    pub max_dimension: u32,

    /// Largest decoded pixel count.
    #[arg(long, default_value_t = DEFAULT_MAX_PIXELS, env = "MOSAIC_MAX_PIXELS")]
    pub max_pixels: usize,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.fit == 0 {
            return Err("fit must be greater than 0".to_string());
        }
        if self.sizes.is_empty() || self.sizes.contains(&0) {
            return Err("sizes must be one or more values greater than 0".to_string());
        }

        if self.palette_size == 0 || self.palette_size > MAX_PALETTE_ENTRIES {
            return Err(format!(
                "palette_size must be between 1 and {}",
                MAX_PALETTE_ENTRIES
            ));
        }
        if !(1..=30).contains(&self.sample_factor) {
            return Err("sample_factor must be between 1 and 30".to_string());
        }
        if self.posterize == Some(0) {
            return Err("posterize must be greater than 0".to_string());
        }

        // Validate JPEG quality
        if !is_valid_quality(self.jpeg_quality) {
            return Err("jpeg_quality must be between 1 and 100".to_string());
        }

        if self.max_input_bytes == 0 {
            return Err("max_input_bytes must be greater than 0".to_string());
        }
        if self.max_output_bytes == 0 {
            return Err("max_output_bytes must be greater than 0".to_string());
        }
        if self.max_dimension == 0 {
            return Err("max_dimension must be greater than 0".to_string());
        }
        if self.max_pixels == 0 {
            return Err("max_pixels must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Arena limits for the service.
    pub fn limits(&self) -> Limits {
        Limits {
            max_input_bytes: self.max_input_bytes,
            max_output_bytes: self.max_output_bytes,
            max_dimension: self.max_dimension,
            max_pixels: self.max_pixels,
            max_palette_entries: MAX_PALETTE_ENTRIES,
        }
    }

    /// Per-request pipeline options.
    pub fn options(&self) -> MosaicOptions {
        MosaicOptions {
            fit: self.fit,
            sizes: self.sizes.clone(),
            quantize: self.quantize,
            palette_size: self.palette_size,
            square: self.square,
            posterize: self.posterize,
        }
    }

    /// Path an output image called `name` is written to.
    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

// =============================================================================
// Tests
// =============================================================================
