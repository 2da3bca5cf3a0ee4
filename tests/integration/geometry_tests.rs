//! Geometry integration tests.
//!
//! Tests run the transforms on decoded images and check the mosaic
//! invariants: dimensions divisible by the tile size, the long side fitted,
//! seams on every block boundary and solid blocks in between.

use pixel_mosaic::arena::RasterArena;
use pixel_mosaic::codec::{Codec, ImageCodec};
use pixel_mosaic::raster::{
    evenfit, expand, fit_dimensions, is_seam, square_crop, square_fit, tile, ImageResampler,
    PixelRaster, PAD_LEVEL,
};

use super::test_utils::{create_test_jpeg, create_test_png, test_limits};

fn decode(file: &[u8]) -> PixelRaster {
    let mut arena = RasterArena::create(test_limits().source_capacity()).unwrap();
    arena.admit_file(file);
    ImageCodec::new().decode_into(&mut arena).unwrap();
    PixelRaster::from_arena(&arena).unwrap()
}

#[test]
fn test_tile_decoded_image() {
    let src = decode(&create_test_jpeg(300, 200));
    let resampler = ImageResampler::new();

    for size in [4, 8, 10] {
        let out = tile(&src, 50, size, &resampler).unwrap();
        assert_eq!(out.width() % size, 0);
        assert_eq!(out.height() % size, 0);
        assert_eq!(out.width() / size, 50);
        assert!((out.height() / size).abs_diff(33) <= 1);
    }
}

#[test]
fn test_tile_seams_and_blocks() {
    let src = decode(&create_test_png(120, 90));
    let size = 6;
    let out = tile(&src, 20, size, &ImageResampler::new()).unwrap();
    let (width, height) = out.dimensions();

    for i in 0..height {
        for j in 0..width {
            if is_seam(&out, i, j, size) {
                assert_eq!(out.pixel(i, j), &[0, 0, 0], "seam at ({}, {})", i, j);
            }
        }
    }

    // Inside one block every non-seam pixel has the block's colour
    let block = out.pixel(size + 2, size + 2).to_vec();
    for i in size + 1..2 * size {
        for j in size + 1..2 * size {
            assert_eq!(out.pixel(i, j), &block[..]);
        }
    }
}

#[test]
fn test_evenfit_never_grows() {
    let src = decode(&create_test_png(101, 67));
    for m in [2, 3, 8, 16] {
        let out = evenfit(&src, m, &ImageResampler::new()).unwrap();
        assert_eq!(out.width() % m, 0);
        assert_eq!(out.height() % m, 0);
        assert!(out.width() <= 101 && out.height() <= 67);
        assert!(101 - out.width() < m && 67 - out.height() < m);
    }
}

#[test]
fn test_fit_dimensions_keeps_aspect() {
    assert_eq!(fit_dimensions(1600, 900, 400), (225, 400));
    assert_eq!(fit_dimensions(900, 1600, 400), (400, 225));
    assert_eq!(fit_dimensions(10, 10, 400), (400, 400));
}

#[test]
fn test_expand_then_tile_dimensions() {
    let src = PixelRaster::filled(7, 3, &[1, 2, 3]).unwrap();
    let out = expand(&src, 5).unwrap();
    assert_eq!(out.dimensions(), (35, 15));
    assert!(out.as_bytes().chunks_exact(3).all(|px| px == [1, 2, 3]));
}

#[test]
fn test_square_crop_and_fit_on_decoded_image() {
    let src = decode(&create_test_png(150, 100));

    let cropped = square_crop(&src).unwrap();
    assert_eq!(cropped.dimensions(), (96, 96));
    // Centred: column offset (150 - 96) / 2 = 27, row offset 2
    assert_eq!(cropped.pixel(0, 0), src.pixel(2, 27));

    let fitted = square_fit(&src, 60, &ImageResampler::new()).unwrap();
    assert_eq!(fitted.dimensions(), (60, 60));
    // 150x100 fits to 60x40, leaving 10 rows of padding above and below
    assert_eq!(fitted.pixel(9, 30), &[PAD_LEVEL; 3]);
    assert_ne!(fitted.pixel(10, 30), &[PAD_LEVEL; 3]);
    assert_eq!(fitted.pixel(50, 30), &[PAD_LEVEL; 3]);
}
