//! Fixed-capacity storage for one request.
//!
//! Arenas are created when a request is set up, with capacities derived from
//! [`Limits`], and released exactly once at teardown. They never grow, so any
//! view derived from their buffers stays valid for the arena's lifetime.

mod limits;
mod raster_arena;

pub use limits::{
    ArenaCapacity, Limits, DEFAULT_MAX_DIMENSION, DEFAULT_MAX_INPUT_BYTES,
    DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_MAX_PIXELS, MAX_PALETTE_ENTRIES, RGB_CHANNELS,
};
pub use raster_arena::{PixelBuffer, RasterArena};
