use thiserror::Error;

/// Errors that can occur while running an image through the mosaic pipeline.
///
/// Every variant maps to a stable numeric code (see [`MosaicError::code`])
/// that is reported to the caller in the response envelope. Collaborator
/// errors (codec, resampler, quantizer) are translated into these variants at
/// the adapter boundary and carry the collaborator's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MosaicError {
    /// A buffer could not be reserved
    #[error("Allocation failure: could not reserve {requested} bytes for {what}")]
    AllocationFailure { what: &'static str, requested: usize },

    /// The request carried no image bytes
    #[error("Input is empty")]
    InputEmpty,

    /// The request file does not fit the input arena
    #[error("Input too large: {size} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    /// The file is neither PNG nor JPEG
    #[error("Unrecognized image format")]
    UnrecognizedFormat,

    /// The codec rejected the file
    #[error("Decode failure: {message}")]
    DecodeFailure { message: String },

    /// The decoded raster would not fit the preallocated pixel buffer
    #[error("Dimension limit exceeded: {width}x{height}x{channels} exceeds {reason}")]
    DimensionLimitExceeded {
        width: u32,
        height: u32,
        channels: u8,
        reason: String,
    },

    /// The resampler reported an error
    #[error("Resample failure: {message}")]
    ResampleFailure { message: String },

    /// The quantizer reported an error or returned a malformed palette
    #[error("Quantize failure: {message}")]
    QuantizeFailure { message: String },

    /// The encoder reported an error or the output did not fit its arena
    #[error("Encode failure: {message}")]
    EncodeFailure { message: String },

    /// A transform was called with an argument it cannot honor
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: &'static str, message: String },
}

/// Response code reported for a successful request.
pub const SUCCESS_CODE: u32 = 0;

impl MosaicError {
    /// Stable numeric code reported as `errno` in the response.
    pub const fn code(&self) -> u32 {
        match self {
            MosaicError::AllocationFailure { .. } => 1,
            MosaicError::InputEmpty => 2,
            MosaicError::InputTooLarge { .. } => 3,
            MosaicError::UnrecognizedFormat => 4,
            MosaicError::DecodeFailure { .. } => 5,
            MosaicError::DimensionLimitExceeded { .. } => 6,
            MosaicError::ResampleFailure { .. } => 7,
            MosaicError::QuantizeFailure { .. } => 8,
            MosaicError::EncodeFailure { .. } => 9,
            MosaicError::InvalidParameter { .. } => 10,
        }
    }

    /// Error type identifier (e.g. "input_empty", "decode_failure").
    pub const fn kind(&self) -> &'static str {
        match self {
            MosaicError::AllocationFailure { .. } => "allocation_failure",
            MosaicError::InputEmpty => "input_empty",
            MosaicError::InputTooLarge { .. } => "input_too_large",
            MosaicError::UnrecognizedFormat => "unrecognized_format",
            MosaicError::DecodeFailure { .. } => "decode_failure",
            MosaicError::DimensionLimitExceeded { .. } => "dimension_limit_exceeded",
            MosaicError::ResampleFailure { .. } => "resample_failure",
            MosaicError::QuantizeFailure { .. } => "quantize_failure",
            MosaicError::EncodeFailure { .. } => "encode_failure",
            MosaicError::InvalidParameter { .. } => "invalid_parameter",
        }
    }

    pub(crate) fn allocation(what: &'static str, requested: usize) -> Self {
        MosaicError::AllocationFailure { what, requested }
    }

    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        MosaicError::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
