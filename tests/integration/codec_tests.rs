//! Codec integration tests.
//!
//! Tests verify:
//! - PNG and JPEG files decode into the arena as RGB
//! - Oversized images are rejected before decoding
//! - Encoded output round-trips with the same dimensions
//! - Indexed PNG output carries the palette

use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};

use pixel_mosaic::arena::{Limits, RasterArena};
use pixel_mosaic::codec::{
    detect_format, ArenaReader, Codec, ImageCodec, OutputFormat, SourceFormat,
};
use pixel_mosaic::error::MosaicError;
use pixel_mosaic::quantize::{quantize_raster, NeuQuantizer};
use pixel_mosaic::raster::PixelRaster;

use super::test_utils::{
    create_flat_png, create_test_jpeg, create_test_png, is_valid_jpeg, is_valid_png, test_limits,
};

fn source_arena(limits: Limits, file: &[u8]) -> RasterArena {
    let mut arena = RasterArena::create(limits.source_capacity()).unwrap();
    arena.admit_file(file);
    arena
}

fn output_arena(limits: Limits) -> RasterArena {
    RasterArena::create(limits.output_capacity()).unwrap()
}

// =============================================================================
// Decoding
// =============================================================================

#[test]
fn test_decode_png_and_jpeg() {
    let codec = ImageCodec::new();

    let mut png = source_arena(test_limits(), &create_test_png(64, 40));
    codec.decode_into(&mut png).unwrap();
    assert_eq!(png.format(), SourceFormat::Png);
    assert_eq!((png.width(), png.height(), png.channels()), (64, 40, 3));
    assert_eq!(png.pixels().len(), 64 * 40 * 3);

    let mut jpeg = source_arena(test_limits(), &create_test_jpeg(48, 48));
    codec.decode_into(&mut jpeg).unwrap();
    assert_eq!(jpeg.format(), SourceFormat::Jpeg);
    assert_eq!((jpeg.width(), jpeg.height(), jpeg.channels()), (48, 48, 3));
}

#[test]
fn test_decoded_rows_follow_stride() {
    let mut arena = source_arena(test_limits(), &create_flat_png(5, 3, [9, 8, 7]));
    ImageCodec::new().decode_into(&mut arena).unwrap();

    let rows: Vec<&[u8]> = arena.pixels().rows().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.len() == 15));
    assert_eq!(&rows[2][12..], &[9, 8, 7]);
    assert!(arena.pixels().row(3).is_none());
}

#[test]
fn test_decode_16_bit_grey_png_as_rgb() {
    let grey = ImageBuffer::from_fn(6, 4, |x, _| Luma([x as u16 * 10_000]));
    let mut file = Cursor::new(Vec::new());
    DynamicImage::ImageLuma16(grey)
        .write_to(&mut file, ImageFormat::Png)
        .unwrap();

    let mut arena = source_arena(test_limits(), file.get_ref());
    ImageCodec::new().decode_into(&mut arena).unwrap();

    assert_eq!((arena.width(), arena.height(), arena.channels()), (6, 4, 3));
    assert_eq!(arena.pixels().len(), 6 * 4 * 3);
    for px in arena.pixels().as_slice().chunks_exact(3) {
        assert!(px[0] == px[1] && px[1] == px[2]);
    }
    let row = arena.pixels().row(0).unwrap();
    assert_eq!(&row[..3], &[0, 0, 0]);
    assert!(row[15] > row[3]);
}

#[test]
fn test_decode_rejects_oversized_dimension() {
    let limits = Limits {
        max_dimension: 32,
        ..test_limits()
    };
    let mut arena = source_arena(limits, &create_test_png(64, 16));

    match ImageCodec::new().decode_into(&mut arena) {
        Err(MosaicError::DimensionLimitExceeded { width, height, .. }) => {
            assert_eq!((width, height), (64, 16));
        }
        other => panic!("Expected DimensionLimitExceeded, got {:?}", other),
    }
    assert!(arena.pixels().is_empty());
}

#[test]
fn test_decode_rejects_oversized_pixel_count() {
    let limits = Limits {
        max_pixels: 100,
        ..test_limits()
    };
    let mut arena = source_arena(limits, &create_test_jpeg(20, 20));

    assert!(matches!(
        ImageCodec::new().decode_into(&mut arena),
        Err(MosaicError::DimensionLimitExceeded { .. })
    ));
    assert!(arena.pixels().len() <= arena.pixels().capacity());
}

#[test]
fn test_decode_garbage() {
    let mut arena = source_arena(test_limits(), b"not an image at all");
    assert_eq!(
        ImageCodec::new().decode_into(&mut arena),
        Err(MosaicError::UnrecognizedFormat)
    );

    // A PNG signature followed by junk
    let mut file = create_test_png(4, 4)[..8].to_vec();
    file.extend_from_slice(&[0xAB; 32]);
    let mut arena = source_arena(test_limits(), &file);
    assert!(matches!(
        ImageCodec::new().decode_into(&mut arena),
        Err(MosaicError::DecodeFailure { .. })
    ));
}

#[test]
fn test_reader_streams_whole_file() {
    let file = create_test_png(8, 8);
    let mut reader = ArenaReader::new(&file);

    let mut total = 0;
    loop {
        let chunk = reader.pull(7);
        if chunk.is_empty() {
            break;
        }
        assert!(chunk.len() <= 7);
        total += chunk.len();
    }
    assert_eq!(total, file.len());
    assert_eq!(reader.remaining(), 0);
    assert_eq!(detect_format(&file), SourceFormat::Png);
}

// =============================================================================
// Encoding
// =============================================================================

#[test]
fn test_png_round_trip_preserves_dimensions() {
    let codec = ImageCodec::new();
    let mut source = source_arena(test_limits(), &create_test_png(33, 21));
    codec.decode_into(&mut source).unwrap();
    let raster = PixelRaster::from_arena(&source).unwrap();

    let mut out = output_arena(test_limits());
    codec.encode_into(&raster, None, &mut out).unwrap();
    let file = out.take_file();

    assert!(is_valid_png(&file));
    assert_eq!(codec.dimensions(&file).unwrap(), (33, 21));
    assert!(out.file().is_empty());

    // Lossless: decoding again yields the same pixels
    let mut again = source_arena(test_limits(), &file);
    codec.decode_into(&mut again).unwrap();
    assert_eq!(again.pixels().as_slice(), raster.as_bytes());
}

#[test]
fn test_jpeg_round_trip_preserves_dimensions() {
    let codec = ImageCodec::with_output(OutputFormat::Jpeg, 90);
    let mut source = source_arena(test_limits(), &create_test_jpeg(50, 30));
    codec.decode_into(&mut source).unwrap();
    let raster = PixelRaster::from_arena(&source).unwrap();

    let mut out = output_arena(test_limits());
    codec.encode_into(&raster, None, &mut out).unwrap();

    assert!(is_valid_jpeg(out.file()));
    assert_eq!(codec.dimensions(out.file()).unwrap(), (50, 30));
}

#[test]
fn test_indexed_png_carries_palette() {
    let codec = ImageCodec::new();
    let mut source = source_arena(test_limits(), &create_test_png(32, 32));
    codec.decode_into(&mut source).unwrap();
    let raster = PixelRaster::from_arena(&source).unwrap();
    let palette = quantize_raster(&raster, &NeuQuantizer::new(), 16).unwrap();

    let mut out = output_arena(test_limits());
    codec.encode_into(&raster, Some(&palette), &mut out).unwrap();

    let decoder = png::Decoder::new(out.file());
    let reader = decoder.read_info().unwrap();
    let info = reader.info();
    assert_eq!(info.color_type, png::ColorType::Indexed);
    assert_eq!((info.width, info.height), (32, 32));
    assert_eq!(info.palette.as_ref().unwrap().len(), 16 * 3);
}

#[test]
fn test_encode_overflow_is_reported() {
    let limits = Limits {
        max_output_bytes: 50,
        ..test_limits()
    };
    let raster = PixelRaster::filled(64, 64, &[10, 200, 30]).unwrap();
    let mut out = output_arena(limits);

    match ImageCodec::new().encode_into(&raster, None, &mut out) {
        Err(MosaicError::EncodeFailure { message }) => assert!(message.contains("50")),
        other => panic!("Expected EncodeFailure, got {:?}", other),
    }
    assert!(out.file().len() <= 50);
    assert!(out.overflow_write() > 0);
}
