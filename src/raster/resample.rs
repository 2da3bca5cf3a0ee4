//! Resampling collaborator.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, LumaA, Pixel, Rgb, Rgba};

/// Default resampling filter.
pub const DEFAULT_FILTER: FilterType = FilterType::CatmullRom;

/// A resampling collaborator.
///
/// Implementations scale an interleaved 8-bit buffer of `src_w x src_h`
/// pixels to exactly `dst_w x dst_h` pixels with the same channel count.
pub trait Resampler {
    fn resample(
        &self,
        src: &[u8],
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        channels: u8,
    ) -> Result<Vec<u8>, String>;
}

/// Resampler backed by `image::imageops::resize`.
#[derive(Debug, Clone, Copy)]
pub struct ImageResampler {
    filter: FilterType,
}

impl ImageResampler {
    pub fn new() -> Self {
        Self::with_filter(DEFAULT_FILTER)
    }

    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Default for ImageResampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Resampler for ImageResampler {
    fn resample(
        &self,
        src: &[u8],
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        channels: u8,
    ) -> Result<Vec<u8>, String> {
        match channels {
            1 => resize_as::<Luma<u8>>(src, src_w, src_h, dst_w, dst_h, self.filter),
            2 => resize_as::<LumaA<u8>>(src, src_w, src_h, dst_w, dst_h, self.filter),
            3 => resize_as::<Rgb<u8>>(src, src_w, src_h, dst_w, dst_h, self.filter),
            4 => resize_as::<Rgba<u8>>(src, src_w, src_h, dst_w, dst_h, self.filter),
            n => Err(format!("unsupported channel count: {}", n)),
        }
    }
}

fn resize_as<P>(
    src: &[u8],
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
    filter: FilterType,
) -> Result<Vec<u8>, String>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let view = ImageBuffer::<P, &[u8]>::from_raw(src_w, src_h, src).ok_or_else(|| {
        format!(
            "source buffer of {} bytes does not hold {}x{} pixels",
            src.len(),
            src_w,
            src_h
        )
    })?;
    Ok(imageops::resize(&view, dst_w, dst_h, filter).into_raw())
}
