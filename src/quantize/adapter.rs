//! Adapter between RGB rasters and the palette quantizer.
//!
//! The quantizer works on opaque RGBA samples and returns an RGBA palette.
//! The adapter expands the raster, calls the quantizer, validates the result
//! and strips alpha again before the palette is stored.

use color_quant::NeuQuant;
use tracing::debug;

use crate::error::MosaicError;
use crate::raster::PixelRaster;

use super::palette::Palette;

/// Default number of palette entries.
pub const DEFAULT_PALETTE_SIZE: usize = 256;

/// Default NeuQuant sampling factor (1 = best quality, 30 = fastest).
pub const DEFAULT_SAMPLE_FACTOR: i32 = 10;

/// Learning cycles NeuQuant runs over the sampled pixels.
const NEUQUANT_CYCLES: usize = 100;

// =============================================================================
// Quantizer
// =============================================================================

/// A palette quantization collaborator.
pub trait Quantizer {
    /// Derive `palette_size` RGBA entries from `pixel_count` RGBA pixels.
    ///
    /// Returns the packed palette (`palette_size * 4` bytes) or an error
    /// message.
    fn quantize(
        &self,
        rgba: &[u8],
        pixel_count: usize,
        palette_size: usize,
    ) -> Result<Vec<u8>, String>;
}

/// NeuQuant neural-network quantizer.
#[derive(Debug, Clone)]
pub struct NeuQuantizer {
    sample_factor: i32,
}

impl NeuQuantizer {
    pub fn new() -> Self {
        Self::with_sample_factor(DEFAULT_SAMPLE_FACTOR)
    }

    /// Sampling factor, clamped to NeuQuant's supported range of 1-30.
    pub fn with_sample_factor(sample_factor: i32) -> Self {
        Self {
            sample_factor: sample_factor.clamp(1, 30),
        }
    }

    pub fn sample_factor(&self) -> i32 {
        self.sample_factor
    }
}

impl Default for NeuQuantizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Quantizer for NeuQuantizer {
    fn quantize(
        &self,
        rgba: &[u8],
        pixel_count: usize,
        palette_size: usize,
    ) -> Result<Vec<u8>, String> {
        if pixel_count == 0 || rgba.len() != pixel_count * 4 {
            return Err(format!(
                "expected {} RGBA bytes, got {}",
                pixel_count * 4,
                rgba.len()
            ));
        }
        if palette_size == 0 {
            return Err("palette size must be at least 1".to_string());
        }

        // NeuQuant needs at least one sample per learning cycle
        let min_pixels = NEUQUANT_CYCLES * self.sample_factor as usize;
        let network = if pixel_count < min_pixels {
            let repeated: Vec<u8> = rgba.iter().copied().cycle().take(min_pixels * 4).collect();
            NeuQuant::new(self.sample_factor, palette_size, &repeated)
        } else {
            NeuQuant::new(self.sample_factor, palette_size, rgba)
        };
        Ok(network.color_map_rgba())
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// Derive a palette of exactly `palette_size` RGB entries for an RGB raster.
///
/// # Errors
///
/// - `InvalidParameter` if the raster is not RGB or `palette_size` is 0
/// - `AllocationFailure` if the RGBA buffer cannot be reserved
/// - `QuantizeFailure` if the quantizer fails or returns a malformed palette
pub fn quantize_raster<Q: Quantizer + ?Sized>(
    raster: &PixelRaster,
    quantizer: &Q,
    palette_size: usize,
) -> Result<Palette, MosaicError> {
    if raster.channels() != 3 {
        return Err(MosaicError::invalid(
            "channels",
            format!("quantization expects RGB, got {} channels", raster.channels()),
        ));
    }
    if palette_size == 0 {
        return Err(MosaicError::invalid("palette_size", "must be at least 1"));
    }

    let pixel_count = raster.width() as usize * raster.height() as usize;
    let rgba = expand_to_rgba(raster.as_bytes(), pixel_count)?;

    let packed = quantizer
        .quantize(&rgba, pixel_count, palette_size)
        .map_err(|message| MosaicError::QuantizeFailure { message })?;
    drop(rgba);

    if packed.len() != palette_size * 4 {
        return Err(MosaicError::QuantizeFailure {
            message: format!(
                "expected {} palette bytes, got {}",
                palette_size * 4,
                packed.len()
            ),
        });
    }

    let palette = strip_alpha(&packed)?;
    debug!(entries = palette.len(), pixels = pixel_count, "palette derived");
    Ok(palette)
}

/// Expand RGB samples to opaque RGBA.
fn expand_to_rgba(rgb: &[u8], pixel_count: usize) -> Result<Vec<u8>, MosaicError> {
    let len = pixel_count * 4;
    let mut rgba = Vec::new();
    rgba.try_reserve_exact(len)
        .map_err(|_| MosaicError::allocation("rgba buffer", len))?;
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 0xFF]);
    }
    Ok(rgba)
}

/// Drop the alpha byte of every RGBA palette entry.
fn strip_alpha(rgba: &[u8]) -> Result<Palette, MosaicError> {
    let count = rgba.len() / 4;
    let mut entries = Vec::new();
    entries
        .try_reserve_exact(count)
        .map_err(|_| MosaicError::allocation("palette", count * 3))?;
    entries.extend(rgba.chunks_exact(4).map(|c| [c[0], c[1], c[2]]));
    Ok(Palette::new(entries))
}

// =============================================================================
// Tests
// =============================================================================
