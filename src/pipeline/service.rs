//! Mosaic service orchestrating one pipeline run.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          MosaicService                           │
//! │  ┌────────────────────────────────────────────────────────────┐  │
//! │  │                        process()                           │  │
//! │  │  1. Setup arenas      4. Resize (square, posterize)        │  │
//! │  │  2. Decode            5. Tile + encode, per size           │  │
//! │  │  3. Quantize (opt.)   6. Teardown                          │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! │        │                      │                      │           │
//! │        ▼                      ▼                      ▼           │
//! │   ┌─────────┐          ┌─────────────┐        ┌─────────────┐    │
//! │   │  Codec  │          │  Resampler  │        │  Quantizer  │    │
//! │   └─────────┘          └─────────────┘        └─────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step returns a `Result`; the first error short-circuits the rest of
//! the run through `?`. Teardown runs on every path and releases each arena
//! exactly once.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::arena::{Limits, RasterArena};
use crate::codec::{Codec, ImageCodec};
use crate::error::MosaicError;
use crate::quantize::{quantize_raster, NeuQuantizer, Palette, Quantizer};
use crate::raster::{
    posterize, square_crop, square_fit, tile, tile_dimensions, ImageResampler, PixelRaster,
    Resampler,
};

use super::request::{MosaicOptions, MosaicRequest, MosaicResponse, SquareMode, TileImage};
use super::stage::{Stage, StageTrace};

// =============================================================================
// Pipeline Run
// =============================================================================

/// Outcome of [`MosaicService::process`].
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub response: MosaicResponse,
    pub trace: StageTrace,
}

/// The arenas of one run. A slot is filled as soon as its arena exists so
/// teardown sees every arena that was created.
#[derive(Default)]
struct Arenas {
    source: Option<RasterArena>,
    output: Option<RasterArena>,
}

impl Arenas {
    fn created(&self) -> usize {
        self.source.is_some() as usize + self.output.is_some() as usize
    }

    fn overflow(&self) -> (usize, usize) {
        [&self.source, &self.output]
            .into_iter()
            .flatten()
            .fold((0, 0), |(read, write), arena| {
                (read + arena.overflow_read(), write + arena.overflow_write())
            })
    }

    /// Release every arena; returns how many releases took effect.
    fn teardown(&mut self) -> usize {
        [&mut self.source, &mut self.output]
            .into_iter()
            .flatten()
            .map(|arena| arena.release())
            .filter(|released| *released)
            .count()
    }
}

// =============================================================================
// Mosaic Service
// =============================================================================

/// Service that turns an image file into one mosaic per tile size.
///
/// # Type Parameters
///
/// * `C` - Codec (defaults to [`ImageCodec`])
/// * `R` - Resampler (defaults to [`ImageResampler`])
/// * `Q` - Quantizer (defaults to [`NeuQuantizer`])
///
/// # Example
///
/// ```ignore
/// use pixel_mosaic::pipeline::{MosaicRequest, MosaicService};
///
/// let service = MosaicService::new();
/// let run = service.process(&MosaicRequest::new(png_bytes));
///
/// for image in &run.response.images {
///     println!("{}: {} bytes", image.name, image.bytes);
/// }
/// ```
pub struct MosaicService<C = ImageCodec, R = ImageResampler, Q = NeuQuantizer> {
    codec: C,
    resampler: R,
    quantizer: Q,
    limits: Limits,
}

impl MosaicService {
    /// PNG output, default collaborators and default limits.
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self::with_collaborators(
            ImageCodec::new(),
            ImageResampler::new(),
            NeuQuantizer::new(),
            limits,
        )
    }
}

impl Default for MosaicService {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec, R: Resampler, Q: Quantizer> MosaicService<C, R, Q> {
    pub fn with_collaborators(codec: C, resampler: R, quantizer: Q, limits: Limits) -> Self {
        Self {
            codec,
            resampler,
            quantizer,
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Run the whole pipeline for one request.
    ///
    /// Never panics on bad input: every failure is reported through the
    /// response's `errno`, and the trace records where the run stopped.
    pub fn process(&self, request: &MosaicRequest) -> PipelineRun {
        let started = Instant::now();
        let mut trace = StageTrace::default();
        let mut arenas = Arenas::default();

        let result = self.run(request, &mut arenas, &mut trace);

        let (overflow_read, overflow_write) = arenas.overflow();
        trace.arenas_created = arenas.created();
        trace.arenas_released = arenas.teardown();

        let mut response = match result {
            Ok((width, height, images)) => {
                trace.finish();
                MosaicResponse::success(width, height, images)
            }
            Err(err) => {
                warn!(
                    stage = ?trace.failed_at,
                    errno = err.code(),
                    error = %err,
                    "mosaic pipeline failed"
                );
                MosaicResponse::failure(&err)
            }
        };
        response.elapsed_ms = started.elapsed().as_millis() as u64;
        response.overflow_read = overflow_read;
        response.overflow_write = overflow_write;

        info!(
            errno = response.errno,
            images = response.images.len(),
            elapsed_ms = response.elapsed_ms,
            arenas_released = trace.arenas_released,
            "mosaic request complete"
        );

        PipelineRun { response, trace }
    }

    fn run(
        &self,
        request: &MosaicRequest,
        arenas: &mut Arenas,
        trace: &mut StageTrace,
    ) -> Result<(u32, u32, Vec<TileImage>), MosaicError> {
        let options = &request.options;

        let (source, output) = trace.record(Stage::Ready, self.setup(request, arenas))?;

        let decoded = trace.record(Stage::Decoded, self.decode(source))?;

        if options.quantize {
            trace.record(
                Stage::Quantized,
                self.quantize(&decoded, options.palette_size, source),
            )?;
        }

        let shaped = trace.record(Stage::Resized, self.resize(decoded, options))?;
        let (width, height) = shaped.dimensions();

        let mut images = Vec::with_capacity(options.sizes.len());
        for &size in &options.sizes {
            let mosaic = trace.record(
                Stage::Tiled,
                self.tile_within_limits(&shaped, options.fit, size),
            )?;
            debug!(
                size,
                width = mosaic.width(),
                height = mosaic.height(),
                "mosaic tiled"
            );

            let image = trace.record(
                Stage::Encoded,
                self.encode(mosaic, size, source.palette(), output),
            )?;
            images.push(image);
        }

        Ok((width, height, images))
    }

    /// Create the arenas and admit the request file.
    fn setup<'a>(
        &self,
        request: &MosaicRequest,
        arenas: &'a mut Arenas,
    ) -> Result<(&'a mut RasterArena, &'a mut RasterArena), MosaicError> {
        request.options.validate()?;
        if request.file.is_empty() {
            return Err(MosaicError::InputEmpty);
        }

        let source = arenas
            .source
            .insert(RasterArena::create(self.limits.source_capacity())?);
        let output = arenas
            .output
            .insert(RasterArena::create(self.limits.output_capacity())?);

        let admitted = source.admit_file(&request.file);
        if admitted < request.file.len() {
            return Err(MosaicError::InputTooLarge {
                size: request.file.len(),
                limit: source.file_capacity(),
            });
        }

        Ok((source, output))
    }

    fn decode(&self, source: &mut RasterArena) -> Result<PixelRaster, MosaicError> {
        self.codec.decode_into(source)?;
        PixelRaster::from_arena(source)
    }

    fn quantize(
        &self,
        raster: &PixelRaster,
        palette_size: usize,
        source: &mut RasterArena,
    ) -> Result<(), MosaicError> {
        let palette = quantize_raster(raster, &self.quantizer, palette_size)?;
        source.store_palette(&palette);
        Ok(())
    }

    fn resize(
        &self,
        decoded: PixelRaster,
        options: &MosaicOptions,
    ) -> Result<PixelRaster, MosaicError> {
        let squared = match options.square {
            SquareMode::None => decoded,
            SquareMode::Crop => square_crop(&decoded)?,
            SquareMode::Fit => {
                let side = decoded.width().max(decoded.height());
                square_fit(&decoded, side, &self.resampler)?
            }
        };

        match options.posterize {
            Some(level) => posterize(&squared, level),
            None => Ok(squared),
        }
    }

    /// Tile `shaped` once the mosaic it expands to is known to fit the limits.
    fn tile_within_limits(
        &self,
        shaped: &PixelRaster,
        fit: u32,
        size: u32,
    ) -> Result<PixelRaster, MosaicError> {
        if let Some((width, height)) = tile_dimensions(shaped.width(), shaped.height(), fit, size)
        {
            self.limits.check_raster(width, height, shaped.channels())?;
        }
        tile(shaped, fit, size, &self.resampler)
    }

    fn encode(
        &self,
        mut mosaic: PixelRaster,
        size: u32,
        palette: Option<&Palette>,
        output: &mut RasterArena,
    ) -> Result<TileImage, MosaicError> {
        self.codec.encode_into(&mosaic, palette, output)?;
        let data = output.take_file();
        mosaic.set_encoded(data.clone());

        Ok(TileImage {
            name: format!("mosaic-{}.{}", size, self.codec.output_format().extension()),
            size,
            width: mosaic.width(),
            height: mosaic.height(),
            bytes: data.len(),
            data,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
