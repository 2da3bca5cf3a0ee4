use bytes::Bytes;

use crate::arena::RasterArena;
use crate::error::MosaicError;

/// Allocate `len` zeroed bytes, reporting failure instead of aborting.
fn alloc_zeroed(what: &'static str, len: usize) -> Result<Vec<u8>, MosaicError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| MosaicError::allocation(what, len))?;
    buf.resize(len, 0);
    Ok(buf)
}

fn byte_len(width: u32, height: u32, channels: u8) -> Result<usize, MosaicError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels as usize))
        .ok_or_else(|| {
            MosaicError::invalid(
                "dimensions",
                format!("{}x{}x{} overflows", width, height, channels),
            )
        })
}

/// An owned pixel raster.
///
/// Pixels are interleaved 8-bit samples, row-major, `channels` bytes per
/// pixel. Row views are computed from the stride on demand. A raster may also
/// carry its encoded file once the pipeline has encoded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelRaster {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    file: Option<Bytes>,
}

impl PixelRaster {
    /// Allocate a zeroed (black) raster.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self, MosaicError> {
        if channels == 0 {
            return Err(MosaicError::invalid("channels", "must be at least 1"));
        }
        let len = byte_len(width, height, channels)?;
        Ok(Self {
            pixels: alloc_zeroed("raster", len)?,
            width,
            height,
            channels,
            file: None,
        })
    }

    /// Allocate a raster with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: &[u8]) -> Result<Self, MosaicError> {
        let channels = u8::try_from(color.len())
            .map_err(|_| MosaicError::invalid("color", "too many channels"))?;
        let mut raster = Self::new(width, height, channels)?;
        for px in raster.pixels.chunks_exact_mut(color.len()) {
            px.copy_from_slice(color);
        }
        Ok(raster)
    }

    /// Wrap existing pixel bytes. The length must match the dimensions.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> Result<Self, MosaicError> {
        if channels == 0 {
            return Err(MosaicError::invalid("channels", "must be at least 1"));
        }
        let expected = byte_len(width, height, channels)?;
        if pixels.len() != expected {
            return Err(MosaicError::invalid(
                "pixels",
                format!("expected {} bytes, got {}", expected, pixels.len()),
            ));
        }
        Ok(Self {
            pixels,
            width,
            height,
            channels,
            file: None,
        })
    }

    /// Copy the decoded pixels out of an arena.
    pub fn from_arena(arena: &RasterArena) -> Result<Self, MosaicError> {
        let source = arena.pixels();
        let mut raster = Self::new(source.width(), source.height(), source.channels())?;
        raster.pixels.copy_from_slice(source.as_slice());
        Ok(raster)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Row `i`. Panics if `i` is out of range.
    pub fn row(&self, i: u32) -> &[u8] {
        let stride = self.stride();
        let start = i as usize * stride;
        &self.pixels[start..start + stride]
    }

    pub fn row_mut(&mut self, i: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = i as usize * stride;
        &mut self.pixels[start..start + stride]
    }

    /// Pixel at row `i`, column `j`. Panics if out of range.
    pub fn pixel(&self, i: u32, j: u32) -> &[u8] {
        let c = self.channels as usize;
        let start = j as usize * c;
        &self.row(i)[start..start + c]
    }

    pub fn set_pixel(&mut self, i: u32, j: u32, color: &[u8]) {
        let c = self.channels as usize;
        let start = j as usize * c;
        self.row_mut(i)[start..start + c].copy_from_slice(&color[..c]);
    }

    /// Paint every pixel of row `i`.
    pub fn fill_row(&mut self, i: u32, color: &[u8]) {
        let c = self.channels as usize;
        for px in self.row_mut(i).chunks_exact_mut(c) {
            px.copy_from_slice(&color[..c]);
        }
    }

    /// Paint every pixel of column `j`.
    pub fn fill_col(&mut self, j: u32, color: &[u8]) {
        for i in 0..self.height {
            self.set_pixel(i, j, color);
        }
    }

    /// Copy `n` pixels from `src` at `(src_i, src_j)` to `(dst_i, dst_j)`.
    pub fn copy_span(
        &mut self,
        dst_i: u32,
        dst_j: u32,
        src: &PixelRaster,
        src_i: u32,
        src_j: u32,
        n: u32,
    ) {
        let c = self.channels as usize;
        let len = n as usize * c;
        let dst_start = dst_j as usize * c;
        let src_start = src_j as usize * c;
        self.row_mut(dst_i)[dst_start..dst_start + len]
            .copy_from_slice(&src.row(src_i)[src_start..src_start + len]);
    }

    /// The encoded file, once the raster has been encoded.
    pub fn encoded(&self) -> Option<&Bytes> {
        self.file.as_ref()
    }

    pub fn set_encoded(&mut self, file: Bytes) {
        self.file = Some(file);
    }
}
