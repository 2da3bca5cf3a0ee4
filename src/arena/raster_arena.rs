use bytes::Bytes;
use tracing::{debug, warn};

use crate::codec::SourceFormat;
use crate::error::MosaicError;
use crate::quantize::Palette;

use super::limits::ArenaCapacity;

// =============================================================================
// Buffers
// =============================================================================

/// Reserve exactly `capacity` elements, reporting failure instead of aborting.
fn reserve<T>(what: &'static str, capacity: usize) -> Result<Vec<T>, MosaicError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(capacity).map_err(|_| {
        MosaicError::allocation(what, capacity.saturating_mul(std::mem::size_of::<T>()))
    })?;
    Ok(buf)
}

/// Fixed-capacity pixel storage with a derived row index.
///
/// The backing vector is reserved once and never grows: every write is
/// checked against `capacity` first, so row views computed from the base and
/// stride cannot outlive a reallocation.
#[derive(Debug)]
pub struct PixelBuffer {
    data: Vec<u8>,
    capacity: usize,
    max_dimension: u32,
    width: u32,
    height: u32,
    channels: u8,
}

impl PixelBuffer {
    fn with_capacity(capacity: usize, max_dimension: u32) -> Result<Self, MosaicError> {
        Ok(Self {
            data: reserve("pixel buffer", capacity)?,
            capacity,
            max_dimension,
            width: 0,
            height: 0,
            channels: 0,
        })
    }

    /// Check that a `width x height x channels` raster fits this buffer.
    ///
    /// Returns the number of bytes the raster needs.
    pub fn check_dimensions(
        &self,
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<usize, MosaicError> {
        let exceeded = |reason: String| MosaicError::DimensionLimitExceeded {
            width,
            height,
            channels,
            reason,
        };

        if width > self.max_dimension || height > self.max_dimension {
            return Err(exceeded(format!(
                "the maximum dimension of {}",
                self.max_dimension
            )));
        }

        let needed = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .filter(|&n| n <= self.capacity)
            .ok_or_else(|| exceeded(format!("the pixel capacity of {} bytes", self.capacity)))?;

        Ok(needed)
    }

    /// Size the buffer for a raster and return the writable pixel bytes.
    ///
    /// Fails with `DimensionLimitExceeded` before touching the buffer when
    /// the raster does not fit.
    pub fn prepare(
        &mut self,
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<&mut [u8], MosaicError> {
        let needed = self.check_dimensions(width, height, channels)?;

        self.data.clear();
        // Within the reserved capacity, so this never reallocates
        self.data.resize(needed, 0);
        self.width = width;
        self.height = height;
        self.channels = channels;

        Ok(&mut self.data)
    }

    /// Forget the current raster (e.g. after a failed decode).
    pub fn clear(&mut self) {
        self.data.clear();
        self.width = 0;
        self.height = 0;
        self.channels = 0;
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

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Row `i`, derived from the buffer base on every call.
    pub fn row(&self, i: u32) -> Option<&[u8]> {
        if i >= self.height {
            return None;
        }
        let stride = self.stride();
        let start = i as usize * stride;
        self.data.get(start..start + stride)
    }

    /// Iterate over all rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.stride().max(1))
    }
}

// =============================================================================
// Raster Arena
// =============================================================================

/// Fixed-capacity backing storage for one raster image.
///
/// An arena holds the encoded file bytes, the decoded pixels and an optional
/// palette. Capacities come from [`ArenaCapacity`] and are reserved once in
/// [`RasterArena::create`]; all later writes are clipped to them and the
/// clipped amounts are tallied in `overflow_read` / `overflow_write`.
///
/// # Example
///
/// ```
/// use pixel_mosaic::arena::{Limits, RasterArena};
///
/// let mut arena = RasterArena::create(Limits::default().source_capacity()).unwrap();
/// assert_eq!(arena.admit_file(b"\x89PNG"), 4);
/// assert!(arena.release());
/// assert!(!arena.release());
/// ```
#[derive(Debug)]
pub struct RasterArena {
    file: Vec<u8>,
    file_capacity: usize,
    format: SourceFormat,
    pixels: PixelBuffer,
    palette: Palette,
    palette_capacity: usize,
    overflow_read: usize,
    overflow_write: usize,
    released: bool,
}

impl RasterArena {
    /// Reserve all storage for one arena.
    ///
    /// If any reservation fails, the ones that already succeeded are dropped
    /// and `AllocationFailure` is returned.
    pub fn create(capacity: ArenaCapacity) -> Result<Self, MosaicError> {
        let file = reserve("file buffer", capacity.file_bytes)?;
        let pixels = PixelBuffer::with_capacity(capacity.pixel_bytes, capacity.max_dimension)?;
        let palette = Palette::new(reserve("palette", capacity.palette_entries)?);

        debug!(
            file_bytes = capacity.file_bytes,
            pixel_bytes = capacity.pixel_bytes,
            palette_entries = capacity.palette_entries,
            "arena created"
        );

        Ok(Self {
            file,
            file_capacity: capacity.file_bytes,
            format: SourceFormat::Other,
            pixels,
            palette,
            palette_capacity: capacity.palette_entries,
            overflow_read: 0,
            overflow_write: 0,
            released: false,
        })
    }

    /// Release all storage.
    ///
    /// Returns `true` the first time and `false` on every later call.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        self.file = Vec::new();
        self.file_capacity = 0;
        self.pixels = PixelBuffer {
            data: Vec::new(),
            capacity: 0,
            max_dimension: 0,
            width: 0,
            height: 0,
            channels: 0,
        };
        self.palette = Palette::default();
        self.palette_capacity = 0;
        true
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    // -------------------------------------------------------------------------
    // File bytes
    // -------------------------------------------------------------------------

    /// Copy request bytes into the file buffer.
    ///
    /// Bytes past the remaining capacity are clipped and counted in
    /// `overflow_read`. Returns the number of bytes admitted.
    pub fn admit_file(&mut self, data: &[u8]) -> usize {
        let admitted = self.append_file(data);
        let clipped = data.len() - admitted;
        if clipped > 0 {
            self.overflow_read += clipped;
            warn!(
                clipped,
                capacity = self.file_capacity,
                "request file clipped to arena capacity"
            );
        }
        admitted
    }

    /// Append to the file buffer, clipping to capacity. Returns bytes written.
    fn append_file(&mut self, data: &[u8]) -> usize {
        let remaining = self.file_capacity.saturating_sub(self.file.len());
        let admitted = data.len().min(remaining);
        // Within the reserved capacity, so this never reallocates
        self.file.extend_from_slice(&data[..admitted]);
        admitted
    }

    /// Append encoded output. Clipped bytes are counted in `overflow_write`.
    pub(crate) fn push_file(&mut self, data: &[u8]) -> usize {
        let admitted = self.append_file(data);
        self.overflow_write += data.len() - admitted;
        admitted
    }

    /// Copy the file bytes out and empty the buffer for reuse.
    ///
    /// The arena buffer keeps its reservation; only the returned `Bytes` is
    /// newly allocated.
    pub fn take_file(&mut self) -> Bytes {
        let bytes = Bytes::copy_from_slice(&self.file);
        self.file.clear();
        bytes
    }

    /// Reset the file buffer and the write overflow counter.
    pub fn reset_output(&mut self) {
        self.file.clear();
        self.overflow_write = 0;
    }

    pub fn file(&self) -> &[u8] {
        &self.file
    }

    pub fn file_capacity(&self) -> usize {
        self.file_capacity
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn set_format(&mut self, format: SourceFormat) {
        self.format = format;
    }

    // -------------------------------------------------------------------------
    // Pixels
    // -------------------------------------------------------------------------

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut PixelBuffer {
        &mut self.pixels
    }

    /// Borrow the file bytes for reading and the pixel buffer for writing.
    pub fn split_for_decode(&mut self) -> (&[u8], &mut PixelBuffer) {
        (&self.file, &mut self.pixels)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn channels(&self) -> u8 {
        self.pixels.channels()
    }

    // -------------------------------------------------------------------------
    // Palette
    // -------------------------------------------------------------------------

    /// Store a palette, admitting at most the palette capacity.
    ///
    /// Extra entries are counted in `overflow_write`. Returns the number of
    /// entries stored.
    pub fn store_palette(&mut self, palette: &Palette) -> usize {
        let admitted = palette.len().min(self.palette_capacity);
        self.palette.replace_from(&palette.entries()[..admitted]);
        let clipped = palette.len() - admitted;
        if clipped > 0 {
            self.overflow_write += clipped;
            warn!(clipped, "palette clipped to arena capacity");
        }
        admitted
    }

    /// The stored palette, if any.
    pub fn palette(&self) -> Option<&Palette> {
        if self.palette.is_empty() {
            None
        } else {
            Some(&self.palette)
        }
    }

    // -------------------------------------------------------------------------
    // Diagnostics
    // -------------------------------------------------------------------------

    pub fn overflow_read(&self) -> usize {
        self.overflow_read
    }

    pub fn overflow_write(&self) -> usize {
        self.overflow_write
    }
}

impl Drop for RasterArena {
    fn drop(&mut self) {
        self.release();
    }
}

// =============================================================================
// Tests
// =============================================================================
