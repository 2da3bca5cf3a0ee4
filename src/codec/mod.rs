//! Codec layer.
//!
//! Bridges encoded files and the pixel buffers of a [`RasterArena`].
//!
//! ```text
//! ┌──────────────┐  pull   ┌──────────────┐  decode_into  ┌──────────────┐
//! │ arena file   │ ──────▶ │ ArenaReader  │ ────────────▶ │ arena pixels │
//! └──────────────┘         └──────────────┘               └──────────────┘
//!
//! ┌──────────────┐  encode_into  ┌──────────────┐  push   ┌──────────────┐
//! │ PixelRaster  │ ────────────▶ │ ArenaWriter  │ ──────▶ │ output file  │
//! └──────────────┘               └──────────────┘         └──────────────┘
//! ```
//!
//! # Components
//!
//! - [`detect_format`]: magic-byte sniffing for PNG and JPEG
//! - [`ArenaReader`] / [`ArenaWriter`]: bounded pull and push adapters
//! - [`Codec`]: decode/encode collaborator, implemented by [`ImageCodec`]
//!
//! [`RasterArena`]: crate::arena::RasterArena

mod bridge;
mod detect;
mod image_codec;

pub use bridge::{ArenaReader, ArenaWriter};
pub use detect::{
    detect_format, is_jpeg_header, is_png_header, SourceFormat, JPEG_SIGNATURE, PNG_SIGNATURE,
};
pub use image_codec::{
    clamp_quality, is_valid_quality, Codec, ImageCodec, OutputFormat, DEFAULT_JPEG_QUALITY,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
