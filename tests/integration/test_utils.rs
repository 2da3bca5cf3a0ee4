//! Test utilities for integration tests.
//!
//! This module provides image fixtures built with the `image` crate and
//! counting collaborators that can be told to fail, for checking how the
//! pipeline short-circuits.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

use pixel_mosaic::arena::{Limits, RasterArena};
use pixel_mosaic::codec::{Codec, ImageCodec, OutputFormat};
use pixel_mosaic::error::MosaicError;
use pixel_mosaic::pipeline::MosaicService;
use pixel_mosaic::quantize::{NeuQuantizer, Palette, Quantizer};
use pixel_mosaic::raster::{ImageResampler, PixelRaster, Resampler};

// =============================================================================
// Image Fixtures
// =============================================================================

/// An RGB gradient with a distinct colour per pixel position.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    })
}

/// Encode a gradient as PNG.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = gradient_image(width, height);
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Encode a gradient as JPEG.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = gradient_image(width, height);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 90)
        .encode_image(&img)
        .unwrap();
    buf
}

/// Encode a single flat colour as PNG.
pub fn create_flat_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Check if data is a valid PNG (starts with the PNG signature).
pub fn is_valid_png(data: &[u8]) -> bool {
    data.len() > 8 && data[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
}

/// Check if data is a valid JPEG (starts with SOI, ends with EOI).
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4
        && data[0] == 0xFF
        && data[1] == 0xD8
        && data[data.len() - 2] == 0xFF
        && data[data.len() - 1] == 0xD9
}

/// Small limits so tests do not reserve the production arenas.
pub fn test_limits() -> Limits {
    Limits {
        max_input_bytes: 1 << 20,
        max_output_bytes: 1 << 20,
        max_dimension: 1024,
        max_pixels: 512 * 512,
        ..Limits::default()
    }
}

// =============================================================================
// Counting Collaborators
// =============================================================================

/// Shared call counters for the instrumented collaborators.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    decodes: Arc<AtomicUsize>,
    encodes: Arc<AtomicUsize>,
    resamples: Arc<AtomicUsize>,
    quantizes: Arc<AtomicUsize>,
}

impl Calls {
    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }

    pub fn encodes(&self) -> usize {
        self.encodes.load(Ordering::SeqCst)
    }

    pub fn resamples(&self) -> usize {
        self.resamples.load(Ordering::SeqCst)
    }

    pub fn quantizes(&self) -> usize {
        self.quantizes.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.decodes() + self.encodes() + self.resamples() + self.quantizes()
    }
}

/// Which collaborator should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inject {
    Nothing,
    Decode,
    Quantize,
    Resample,
    Encode,
}

/// Codec that counts calls and delegates to [`ImageCodec`].
pub struct CountingCodec {
    inner: ImageCodec,
    calls: Calls,
    fail_decode: bool,
    fail_encode: bool,
}

impl Codec for CountingCodec {
    fn output_format(&self) -> OutputFormat {
        self.inner.output_format()
    }

    fn decode_into(&self, arena: &mut RasterArena) -> Result<(), MosaicError> {
        self.calls.decodes.fetch_add(1, Ordering::SeqCst);
        if self.fail_decode {
            return Err(MosaicError::DecodeFailure {
                message: "injected decode failure".to_string(),
            });
        }
        self.inner.decode_into(arena)
    }

    fn encode_into(
        &self,
        raster: &PixelRaster,
        palette: Option<&Palette>,
        out: &mut RasterArena,
    ) -> Result<(), MosaicError> {
        self.calls.encodes.fetch_add(1, Ordering::SeqCst);
        if self.fail_encode {
            return Err(MosaicError::EncodeFailure {
                message: "injected encode failure".to_string(),
            });
        }
        self.inner.encode_into(raster, palette, out)
    }
}

/// Resampler that counts calls and delegates to [`ImageResampler`].
pub struct CountingResampler {
    inner: ImageResampler,
    calls: Calls,
    fail: bool,
}

impl Resampler for CountingResampler {
    fn resample(
        &self,
        src: &[u8],
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        channels: u8,
    ) -> Result<Vec<u8>, String> {
        self.calls.resamples.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err("injected resample failure".to_string());
        }
        self.inner
            .resample(src, src_w, src_h, dst_w, dst_h, channels)
    }
}

/// Quantizer that counts calls and delegates to [`NeuQuantizer`].
pub struct CountingQuantizer {
    inner: NeuQuantizer,
    calls: Calls,
    fail: bool,
}

impl Quantizer for CountingQuantizer {
    fn quantize(
        &self,
        rgba: &[u8],
        pixel_count: usize,
        palette_size: usize,
    ) -> Result<Vec<u8>, String> {
        self.calls.quantizes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err("injected quantize failure".to_string());
        }
        self.inner.quantize(rgba, pixel_count, palette_size)
    }
}

pub type InstrumentedService = MosaicService<CountingCodec, CountingResampler, CountingQuantizer>;

/// Build a service whose collaborators count their calls, with `inject`
/// failing.
pub fn instrumented_service(inject: Inject, limits: Limits) -> (InstrumentedService, Calls) {
    instrumented_service_with_codec(inject, limits, ImageCodec::new())
}

pub fn instrumented_service_with_codec(
    inject: Inject,
    limits: Limits,
    codec: ImageCodec,
) -> (InstrumentedService, Calls) {
    let calls = Calls::default();
    let service = MosaicService::with_collaborators(
        CountingCodec {
            inner: codec,
            calls: calls.clone(),
            fail_decode: inject == Inject::Decode,
            fail_encode: inject == Inject::Encode,
        },
        CountingResampler {
            inner: ImageResampler::new(),
            calls: calls.clone(),
            fail: inject == Inject::Resample,
        },
        CountingQuantizer {
            inner: NeuQuantizer::new(),
            calls: calls.clone(),
            fail: inject == Inject::Quantize,
        },
        limits,
    );
    (service, calls)
}
