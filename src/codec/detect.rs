//! Format detection for request files.
//!
//! Detection is a pure check of the leading magic bytes. It never consumes
//! the buffer, so the decoder always starts from the first byte.

// =============================================================================
// SourceFormat
// =============================================================================

/// Detected format of a request file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    /// Anything the pipeline cannot decode
    Other,
}

impl SourceFormat {
    /// Get a human-readable name for the format.
    pub const fn name(&self) -> &'static str {
        match self {
            SourceFormat::Png => "PNG",
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Other => "unknown",
        }
    }

    /// The matching `image` crate format, if the format is decodable.
    pub(crate) fn image_format(&self) -> Option<image::ImageFormat> {
        match self {
            SourceFormat::Png => Some(image::ImageFormat::Png),
            SourceFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            SourceFormat::Other => None,
        }
    }
}

// =============================================================================
// Magic Bytes
// =============================================================================

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// JPEG Start Of Image marker followed by the first marker prefix.
pub const JPEG_SIGNATURE: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Check if bytes start with the PNG signature.
pub fn is_png_header(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

/// Check if bytes start with a JPEG SOI marker.
pub fn is_jpeg_header(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_SIGNATURE)
}

/// Detect the format of a request file from its first bytes.
pub fn detect_format(bytes: &[u8]) -> SourceFormat {
    if is_png_header(bytes) {
        SourceFormat::Png
    } else if is_jpeg_header(bytes) {
        SourceFormat::Jpeg
    } else {
        SourceFormat::Other
    }
}

// =============================================================================
// Tests
// =============================================================================
