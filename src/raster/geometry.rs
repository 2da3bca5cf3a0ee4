//! Geometry transforms over pixel rasters.
//!
//! Every transform borrows its input and returns a newly allocated raster;
//! inputs are never modified. Transforms that change the sampling grid go
//! through a [`Resampler`].
//!
//! # Rounding
//!
//! [`fitdimension`] rounds the shorter side half away from zero and clamps
//! both sides to `[1, s]`. [`square_fit`] puts `slack / 2` (rounded down) on
//! the leading side and the remainder on the trailing side.

use tracing::debug;

use crate::error::MosaicError;

use super::pixels::PixelRaster;
use super::resample::Resampler;

/// Grey used to letterbox [`square_fit`].
pub const PAD_LEVEL: u8 = 0xBB;

/// Ink used for seam pixels.
pub const SEAM_LEVEL: u8 = 0x00;

/// Square crops are trimmed to a multiple of this many pixels.
pub const SQUARE_CROP_MULTIPLE: u32 = 8;

/// A solid colour of `channels` samples: `level` for colour samples and
/// opaque for the alpha sample of LA/RGBA rasters.
fn solid(channels: u8, level: u8) -> Vec<u8> {
    let mut color = vec![level; channels as usize];
    if channels == 2 || channels == 4 {
        color[channels as usize - 1] = 0xFF;
    }
    color
}

fn require_nonzero(name: &'static str, value: u32) -> Result<(), MosaicError> {
    if value == 0 {
        Err(MosaicError::invalid(name, "must be greater than 0"))
    } else {
        Ok(())
    }
}

fn require_nonempty(src: &PixelRaster) -> Result<(), MosaicError> {
    if src.width() == 0 || src.height() == 0 {
        Err(MosaicError::invalid(
            "raster",
            format!("{}x{} raster has no pixels", src.width(), src.height()),
        ))
    } else {
        Ok(())
    }
}

// =============================================================================
// Resampling Transforms
// =============================================================================

/// Resample `src` to exactly `rows x cols`, preserving the channel count.
///
/// No partial raster is returned when the resampler fails.
pub fn scale<R: Resampler + ?Sized>(
    src: &PixelRaster,
    rows: u32,
    cols: u32,
    resampler: &R,
) -> Result<PixelRaster, MosaicError> {
    if rows == 0 || cols == 0 {
        return Err(MosaicError::ResampleFailure {
            message: format!(
                "cannot resample {}x{} to {}x{}",
                src.width(),
                src.height(),
                cols,
                rows
            ),
        });
    }

    let pixels = resampler
        .resample(
            src.as_bytes(),
            src.width(),
            src.height(),
            cols,
            rows,
            src.channels(),
        )
        .map_err(|message| MosaicError::ResampleFailure { message })?;

    let len = pixels.len();
    PixelRaster::from_raw(cols, rows, src.channels(), pixels).map_err(|_| {
        MosaicError::ResampleFailure {
            message: format!("resampler returned {} bytes for {}x{}", len, cols, rows),
        }
    })
}

/// Scale `src` down so both dimensions are the largest multiples of `m`
/// that do not exceed the originals.
pub fn evenfit<R: Resampler + ?Sized>(
    src: &PixelRaster,
    m: u32,
    resampler: &R,
) -> Result<PixelRaster, MosaicError> {
    require_nonzero("m", m)?;
    let rows = src.height() - src.height() % m;
    let cols = src.width() - src.width() % m;
    scale(src, rows, cols, resampler)
}

/// Target `(rows, cols)` that bring the longer side of a `width x height`
/// raster to `s` while preserving the aspect ratio.
pub fn fit_dimensions(width: u32, height: u32, s: u32) -> (u32, u32) {
    let ratio = width.max(height) as f64 / s as f64;
    let fit = |side: u32| ((side as f64 / ratio).round() as u32).clamp(1, s);
    (fit(height), fit(width))
}

/// Scale `src`, preserving aspect ratio, so its longer side equals `s`.
pub fn fitdimension<R: Resampler + ?Sized>(
    src: &PixelRaster,
    s: u32,
    resampler: &R,
) -> Result<PixelRaster, MosaicError> {
    require_nonzero("s", s)?;
    require_nonempty(src)?;
    let (rows, cols) = fit_dimensions(src.width(), src.height(), s);
    scale(src, rows, cols, resampler)
}

// =============================================================================
// Pixel Transforms
// =============================================================================

/// Nearest-neighbour magnify: every pixel becomes a `k x k` block.
pub fn expand(src: &PixelRaster, k: u32) -> Result<PixelRaster, MosaicError> {
    require_nonzero("k", k)?;
    let too_large = || {
        MosaicError::invalid(
            "k",
            format!("{}x{} expanded by {} overflows", src.width(), src.height(), k),
        )
    };
    let width = src.width().checked_mul(k).ok_or_else(too_large)?;
    let height = src.height().checked_mul(k).ok_or_else(too_large)?;

    let mut out = PixelRaster::new(width, height, src.channels())?;
    let c = src.channels() as usize;
    let block = k as usize * c;

    for i in 0..src.height() {
        let first = i * k;
        {
            let dst = out.row_mut(first);
            for (px, span) in src.row(i).chunks_exact(c).zip(dst.chunks_exact_mut(block)) {
                for slot in span.chunks_exact_mut(c) {
                    slot.copy_from_slice(px);
                }
            }
        }
        for r in 1..k {
            let stride = out.stride();
            let bytes = out.as_bytes_mut();
            let (head, tail) = bytes.split_at_mut((first + r) as usize * stride);
            let start = first as usize * stride;
            tail[..stride].copy_from_slice(&head[start..start + stride]);
        }
    }

    Ok(out)
}

/// Whether `(i, j)` is a seam pixel of a `width x height` raster with seams
/// every `k` pixels.
///
/// Border pixels are always seams. Inner seams sit on rows and columns that
/// are multiples of `k` and still have a full block after them.
pub fn seam_at(width: u32, height: u32, i: u32, j: u32, k: u32) -> bool {
    let border = i == 0 || j == 0 || i + 1 == height || j + 1 == width;
    if border || k == 0 {
        return border;
    }
    (i % k == 0 && i + k <= height) || (j % k == 0 && j + k <= width)
}

/// Whether the pixel at row `i`, column `j` of `raster` is a seam pixel.
pub fn is_seam(raster: &PixelRaster, i: u32, j: u32, k: u32) -> bool {
    seam_at(raster.width(), raster.height(), i, j, k)
}

/// An independent copy of the pixels of `src`.
///
/// The encoded file, if any, is not carried over.
pub fn copy(src: &PixelRaster) -> Result<PixelRaster, MosaicError> {
    let mut out = PixelRaster::new(src.width(), src.height(), src.channels())?;
    out.as_bytes_mut().copy_from_slice(src.as_bytes());
    Ok(out)
}

/// Copy `src` with every seam pixel painted black.
pub fn draw_seams(src: &PixelRaster, k: u32) -> Result<PixelRaster, MosaicError> {
    require_nonzero("k", k)?;
    let mut out = copy(src)?;
    let ink = solid(src.channels(), SEAM_LEVEL);
    let (width, height) = src.dimensions();

    for i in 0..height {
        for j in 0..width {
            if seam_at(width, height, i, j, k) {
                out.set_pixel(i, j, &ink);
            }
        }
    }

    Ok(out)
}

/// Reduce every colour sample to a multiple of `q`.
pub fn posterize(src: &PixelRaster, q: u8) -> Result<PixelRaster, MosaicError> {
    require_nonzero("q", q as u32)?;
    let mut out = copy(src)?;
    let c = src.channels() as usize;
    let has_alpha = c == 2 || c == 4;

    for px in out.as_bytes_mut().chunks_exact_mut(c) {
        let colour = if has_alpha { c - 1 } else { c };
        for sample in &mut px[..colour] {
            *sample = (*sample / q) * q;
        }
    }

    Ok(out)
}

// =============================================================================
// Composite Transforms
// =============================================================================

/// The mosaic transform.
///
/// 1. [`evenfit`] to a multiple of `size`
/// 2. [`fitdimension`] so the longer side is `fit`
/// 3. [`expand`] every pixel into a `size x size` block
/// 4. [`draw_seams`] every `size` pixels
///
/// Each intermediate is dropped as soon as the next one exists. The output
/// dimensions are multiples of `size`.
pub fn tile<R: Resampler + ?Sized>(
    src: &PixelRaster,
    fit: u32,
    size: u32,
    resampler: &R,
) -> Result<PixelRaster, MosaicError> {
    require_nonzero("fit", fit)?;
    require_nonzero("size", size)?;

    let even = evenfit(src, size, resampler)?;
    let fitted = fitdimension(&even, fit, resampler)?;
    drop(even);
    let expanded = expand(&fitted, size)?;
    debug!(
        fitted_width = fitted.width(),
        fitted_height = fitted.height(),
        size,
        "expanded fitted raster"
    );
    drop(fitted);
    let seamed = draw_seams(&expanded, size)?;
    drop(expanded);

    Ok(seamed)
}

/// `(width, height)` of the raster [`tile`] builds from a `width x height`
/// source, without allocating anything.
///
/// `None` when `fit` or `size` is zero or the source is smaller than one
/// tile, all of which [`tile`] rejects. Sides saturate at `u32::MAX`.
pub fn tile_dimensions(width: u32, height: u32, fit: u32, size: u32) -> Option<(u32, u32)> {
    if fit == 0 || size == 0 {
        return None;
    }
    let cols = width - width % size;
    let rows = height - height % size;
    if rows == 0 || cols == 0 {
        return None;
    }
    let (fit_rows, fit_cols) = fit_dimensions(cols, rows, fit);
    Some((fit_cols.saturating_mul(size), fit_rows.saturating_mul(size)))
}

/// Extract the largest centred square whose side is a multiple of 8.
pub fn square_crop(src: &PixelRaster) -> Result<PixelRaster, MosaicError> {
    let side = src.width().min(src.height());
    let side = side - side % SQUARE_CROP_MULTIPLE;
    if side == 0 {
        return Err(MosaicError::invalid(
            "raster",
            format!(
                "{}x{} is too small for a square crop",
                src.width(),
                src.height()
            ),
        ));
    }

    let top = (src.height() - side) / 2;
    let left = (src.width() - side) / 2;
    let mut out = PixelRaster::new(side, side, src.channels())?;
    for i in 0..side {
        out.copy_span(i, 0, src, top + i, left, side);
    }

    Ok(out)
}

/// Letterbox `src` into a centred `s x s` canvas filled with grey.
pub fn square_fit<R: Resampler + ?Sized>(
    src: &PixelRaster,
    s: u32,
    resampler: &R,
) -> Result<PixelRaster, MosaicError> {
    let fitted = fitdimension(src, s, resampler)?;
    let mut out = PixelRaster::filled(s, s, &solid(src.channels(), PAD_LEVEL))?;

    let top = (s - fitted.height()) / 2;
    let left = (s - fitted.width()) / 2;
    for i in 0..fitted.height() {
        out.copy_span(top + i, left, &fitted, i, 0, fitted.width());
    }

    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================
