//! Pixel rasters and the geometry transforms that build a mosaic.
//!
//! # Components
//!
//! - [`PixelRaster`]: owned, interleaved 8-bit pixel buffer
//! - [`Resampler`]: resampling collaborator, with [`ImageResampler`] as the
//!   default implementation
//! - [`tile`] and friends: the transforms themselves
//!
//! # Example
//!
//! ```
//! use pixel_mosaic::raster::{tile, ImageResampler, PixelRaster};
//!
//! let src = PixelRaster::filled(120, 80, &[200, 120, 40]).unwrap();
//! let mosaic = tile(&src, 20, 8, &ImageResampler::new()).unwrap();
//!
//! assert_eq!(mosaic.width() % 8, 0);
//! assert_eq!(mosaic.height() % 8, 0);
//! ```

mod geometry;
mod pixels;
mod resample;

pub use geometry::{
    copy, draw_seams, evenfit, expand, fit_dimensions, fitdimension, is_seam, posterize, scale,
    seam_at, square_crop, square_fit, tile, tile_dimensions, PAD_LEVEL, SEAM_LEVEL,
    SQUARE_CROP_MULTIPLE,
};
pub use pixels::PixelRaster;
pub use resample::{ImageResampler, Resampler, DEFAULT_FILTER};
