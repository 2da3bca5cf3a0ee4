//! Palette quantization.
//!
//! - [`Palette`]: a fixed list of RGB colours with nearest-colour lookup
//! - [`Quantizer`]: the quantization collaborator interface
//! - [`NeuQuantizer`]: default quantizer backed by `color_quant`
//! - [`quantize_raster`]: converts an RGB raster to the quantizer's RGBA
//!   input and the RGBA result back to an RGB palette

mod adapter;
mod palette;

pub use adapter::{
    quantize_raster, NeuQuantizer, Quantizer, DEFAULT_PALETTE_SIZE, DEFAULT_SAMPLE_FACTOR,
};
pub use palette::Palette;
