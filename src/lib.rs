//! # Pixel Mosaic
//!
//! A bounded-memory pipeline that turns a PNG or JPEG image into tiled
//! mosaics.
//!
//! Every request runs inside fixed-capacity arenas sized from configured
//! limits, so an oversized or malformed upload fails with a typed error
//! instead of growing memory without bound.
//!
//! ## Features
//!
//! - **Bounded decoding**: image dimensions are checked against the arena
//!   before a single pixel is decoded
//! - **Mosaic geometry**: even-fit, aspect-preserving fit, block expansion
//!   and seam drawing
//! - **Palette quantization**: NeuQuant palettes and indexed PNG output
//! - **Fail-fast orchestration**: the first error ends the run and every
//!   arena is released exactly once
//!
//! ## Architecture
//!
//! - [`arena`] - Fixed-capacity request storage and limits
//! - [`codec`] - Format sniffing, bounded reader/writer and the PNG/JPEG codec
//! - [`raster`] - Pixel rasters, resampling and geometry transforms
//! - [`quantize`] - Palettes and the quantizer adapter
//! - [`pipeline`] - Request/response types and the orchestrating service
//! - [`config`] - CLI configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use pixel_mosaic::{MosaicRequest, MosaicService};
//!
//! let file = std::fs::read("photo.jpg").unwrap();
//! let run = MosaicService::new().process(&MosaicRequest::new(file));
//!
//! if run.response.is_success() {
//!     for image in &run.response.images {
//!         std::fs::write(&image.name, &image.data).unwrap();
//!     }
//! }
//! ```

pub mod arena;
pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod quantize;
pub mod raster;

// Re-export commonly used types
pub use arena::{ArenaCapacity, Limits, PixelBuffer, RasterArena};
pub use codec::{
    detect_format, ArenaReader, ArenaWriter, Codec, ImageCodec, OutputFormat, SourceFormat,
};
pub use config::Config;
pub use error::{MosaicError, SUCCESS_CODE};
pub use pipeline::{
    MosaicOptions, MosaicRequest, MosaicResponse, MosaicService, PipelineRun, SquareMode, Stage,
    StageTrace, TileImage,
};
pub use quantize::{quantize_raster, NeuQuantizer, Palette, Quantizer};
pub use raster::{
    draw_seams, evenfit, expand, fitdimension, is_seam, scale, square_crop, square_fit, tile,
    ImageResampler, PixelRaster, Resampler,
};
