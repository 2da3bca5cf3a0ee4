//! PNG/JPEG codec adapter.
//!
//! This module wraps the `image` and `png` crates behind the [`Codec`]
//! trait. Decoding streams from the source arena through an
//! [`ArenaReader`](super::ArenaReader) and writes RGB pixels straight into
//! the arena's fixed pixel buffer; encoding streams into the output arena
//! through an [`ArenaWriter`](super::ArenaWriter).
//!
//! # Design Decisions
//!
//! - **Dimensions first**: the header is decoded and the raster size checked
//!   against the arena before any pixel is decoded.
//! - **Always RGB**: decoded images are expanded or reduced to 8-bit RGB.
//!   RGB8 sources decode straight into the arena. Any other layout (grey,
//!   alpha, 16-bit) is first decoded into a temporary `DynamicImage` outside
//!   the arena, which costs up to 8 more bytes per pixel. That buffer is
//!   bounded by the same dimension check and dropped before decode returns.
//! - **Errors translated here**: `image::ImageError` and
//!   `png::EncodingError` never leave this module.

use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{
    ColorType, DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder, ImageError,
    ImageReader,
};
use tracing::debug;

use crate::arena::{PixelBuffer, RasterArena, RGB_CHANNELS};
use crate::error::MosaicError;
use crate::quantize::Palette;
use crate::raster::PixelRaster;

use super::bridge::{ArenaReader, ArenaWriter};
use super::detect::detect_format;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Largest palette an indexed PNG can carry.
const MAX_INDEXED_ENTRIES: usize = 256;

// =============================================================================
// Output Format
// =============================================================================

/// Encoded format of the pipeline output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// PNG, indexed when a palette is available
    #[default]
    Png,
    /// Baseline JPEG
    Jpeg,
}

impl OutputFormat {
    /// File extension for the format.
    pub const fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

// =============================================================================
// Codec
// =============================================================================

/// A decode/encode collaborator.
pub trait Codec {
    /// Format produced by [`Codec::encode_into`].
    fn output_format(&self) -> OutputFormat;

    /// Decode the arena's file bytes into its pixel buffer as 8-bit RGB.
    fn decode_into(&self, arena: &mut RasterArena) -> Result<(), MosaicError>;

    /// Encode `raster` into the file buffer of `out`, replacing its content.
    fn encode_into(
        &self,
        raster: &PixelRaster,
        palette: Option<&Palette>,
        out: &mut RasterArena,
    ) -> Result<(), MosaicError>;
}

/// Codec backed by the `image` crate, with indexed PNG output via `png`.
///
/// # Example
///
/// ```ignore
/// use pixel_mosaic::codec::{Codec, ImageCodec, OutputFormat};
///
/// let codec = ImageCodec::with_output(OutputFormat::Jpeg, 85);
/// codec.decode_into(&mut source_arena)?;
/// codec.encode_into(&mosaic, None, &mut output_arena)?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageCodec {
    output: OutputFormat,
    quality: u8,
}

impl ImageCodec {
    /// PNG output.
    pub fn new() -> Self {
        Self::with_output(OutputFormat::Png, DEFAULT_JPEG_QUALITY)
    }

    /// Output in `format`; `quality` applies to JPEG and is clamped to 1-100.
    pub fn with_output(format: OutputFormat, quality: u8) -> Self {
        Self {
            output: format,
            quality: clamp_quality(quality),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Get image dimensions without decoding pixels.
    ///
    /// # Returns
    ///
    /// `(width, height)` in pixels.
    pub fn dimensions(&self, source: &[u8]) -> Result<(u32, u32), MosaicError> {
        let format = detect_format(source)
            .image_format()
            .ok_or(MosaicError::UnrecognizedFormat)?;
        let reader = ImageReader::with_format(ArenaReader::new(source), format);
        reader.into_dimensions().map_err(translate_decode_error)
    }
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for ImageCodec {
    fn output_format(&self) -> OutputFormat {
        self.output
    }

    fn decode_into(&self, arena: &mut RasterArena) -> Result<(), MosaicError> {
        if arena.file().is_empty() {
            return Err(MosaicError::InputEmpty);
        }

        let format = detect_format(arena.file());
        arena.set_format(format);
        let image_format = format
            .image_format()
            .ok_or(MosaicError::UnrecognizedFormat)?;

        let (file, pixels) = arena.split_for_decode();
        let result = decode_rgb(file, image_format, pixels);
        if result.is_err() {
            arena.pixels_mut().clear();
        } else {
            debug!(
                format = format.name(),
                width = arena.width(),
                height = arena.height(),
                "decoded source image"
            );
        }
        result
    }

    fn encode_into(
        &self,
        raster: &PixelRaster,
        palette: Option<&Palette>,
        out: &mut RasterArena,
    ) -> Result<(), MosaicError> {
        out.reset_output();
        let capacity = out.file_capacity();

        let mut writer = ArenaWriter::new(out);
        match self.output {
            OutputFormat::Png => match palette {
                Some(palette) if raster.channels() == RGB_CHANNELS => {
                    encode_indexed_png(raster, palette, &mut writer)?
                }
                _ => PngEncoder::new(&mut writer)
                    .write_image(
                        raster.as_bytes(),
                        raster.width(),
                        raster.height(),
                        color_type(raster.channels())?,
                    )
                    .map_err(translate_encode_error)?,
            },
            OutputFormat::Jpeg => {
                let remapped;
                let pixels = match palette {
                    Some(palette) if raster.channels() == RGB_CHANNELS => {
                        let mut copy = raster.as_bytes().to_vec();
                        palette.remap_pixels(&mut copy);
                        remapped = copy;
                        &remapped[..]
                    }
                    _ => raster.as_bytes(),
                };
                JpegEncoder::new_with_quality(&mut writer, self.quality)
                    .write_image(
                        pixels,
                        raster.width(),
                        raster.height(),
                        color_type(raster.channels())?,
                    )
                    .map_err(translate_encode_error)?
            }
        }

        if writer.overflowed() {
            return Err(MosaicError::EncodeFailure {
                message: format!(
                    "encoded output of {} bytes exceeds the limit of {} bytes",
                    writer.pushed(),
                    capacity
                ),
            });
        }

        debug!(
            format = self.output.extension(),
            bytes = writer.pushed(),
            indexed = palette.is_some(),
            "encoded raster"
        );
        Ok(())
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode `file` into `pixels` as 8-bit RGB.
fn decode_rgb(
    file: &[u8],
    format: image::ImageFormat,
    pixels: &mut PixelBuffer,
) -> Result<(), MosaicError> {
    let reader = ImageReader::with_format(ArenaReader::new(file), format);
    let decoder = reader.into_decoder().map_err(translate_decode_error)?;

    let (width, height) = decoder.dimensions();
    pixels.check_dimensions(width, height, RGB_CHANNELS)?;

    if decoder.color_type() == ColorType::Rgb8 {
        let target = pixels.prepare(width, height, RGB_CHANNELS)?;
        decoder.read_image(target).map_err(translate_decode_error)?;
    } else {
        let image = DynamicImage::from_decoder(decoder).map_err(translate_decode_error)?;
        let rgb = image.into_rgb8();
        let target = pixels.prepare(width, height, RGB_CHANNELS)?;
        target.copy_from_slice(rgb.as_raw());
    }

    Ok(())
}

fn translate_decode_error(err: ImageError) -> MosaicError {
    match err {
        ImageError::Limits(e) => MosaicError::DimensionLimitExceeded {
            width: 0,
            height: 0,
            channels: RGB_CHANNELS,
            reason: e.to_string(),
        },
        other => MosaicError::DecodeFailure {
            message: other.to_string(),
        },
    }
}

// =============================================================================
// Encoding
// =============================================================================

fn color_type(channels: u8) -> Result<ExtendedColorType, MosaicError> {
    match channels {
        1 => Ok(ExtendedColorType::L8),
        2 => Ok(ExtendedColorType::La8),
        3 => Ok(ExtendedColorType::Rgb8),
        4 => Ok(ExtendedColorType::Rgba8),
        n => Err(MosaicError::EncodeFailure {
            message: format!("cannot encode {} channels", n),
        }),
    }
}

fn translate_encode_error(err: ImageError) -> MosaicError {
    MosaicError::EncodeFailure {
        message: err.to_string(),
    }
}

fn png_encode_error(err: png::EncodingError) -> MosaicError {
    MosaicError::EncodeFailure {
        message: err.to_string(),
    }
}

/// Write an 8-bit indexed PNG with `palette` as its PLTE chunk.
fn encode_indexed_png<W: Write>(
    raster: &PixelRaster,
    palette: &Palette,
    writer: W,
) -> Result<(), MosaicError> {
    if palette.is_empty() || palette.len() > MAX_INDEXED_ENTRIES {
        return Err(MosaicError::EncodeFailure {
            message: format!(
                "indexed PNG needs 1-{} palette entries, got {}",
                MAX_INDEXED_ENTRIES,
                palette.len()
            ),
        });
    }

    let indices = palette.index_pixels(raster.as_bytes());

    let mut encoder = png::Encoder::new(writer, raster.width(), raster.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(palette.to_rgb_bytes());

    let mut png_writer = encoder.write_header().map_err(png_encode_error)?;
    png_writer
        .write_image_data(&indices)
        .map_err(png_encode_error)?;
    png_writer.finish().map_err(png_encode_error)
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
