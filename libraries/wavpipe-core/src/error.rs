/// Conversion error types
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ConvertError`
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Longest message handed across the host boundary, in bytes.
///
/// Hosts historically received messages through an 80-byte NUL-terminated buffer.
pub const MAX_MESSAGE_LEN: usize = 79;

/// Every way a conversion can fail
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Input or output path is empty
    #[error("Invalid input or output path")]
    InvalidPath,

    /// `max_samples` below -1
    #[error("Invalid max samples: {0}")]
    InvalidSampleCount(i64),

    /// Forced bit depth not in {0, 8, 16, 24, 32}
    #[error("Invalid bits per sample: {0} (must be 8, 16, 24, or 32)")]
    InvalidBitDepth(u32),

    /// Input file could not be opened
    #[error("Cannot open input file {}: {source}", path.display())]
    InputOpen {
        /// Input path as requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The decoder rejected the input stream
    #[error("Cannot open decoder: {0}")]
    DecoderOpen(String),

    /// Channel count outside 1..=100
    #[error("Invalid number of channels: {0}")]
    InvalidChannelCount(u32),

    /// Stream reports no samples
    #[error("Invalid number of samples: {0}")]
    InvalidTotalSamples(u64),

    /// Output file could not be created
    #[error("Cannot open output file {}: {source}", path.display())]
    OutputOpen {
        /// Output path as requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Data chunk would not fit the 32-bit RIFF size fields
    #[error("Audio data size exceeds 32-bit limit ({0} bytes)")]
    DataSizeOverflow(u64),

    /// Writing the 44-byte header failed
    #[error("Failed to write WAV header: {0}")]
    HeaderWrite(#[source] std::io::Error),

    /// The decoder failed while unpacking a chunk
    #[error("Failed to unpack samples: {0}")]
    DecodeUnpack(String),

    /// Writing converted samples failed
    #[error("Failed to write audio samples: {0}")]
    SampleWrite(#[source] std::io::Error),

    /// The decoder counted integrity (CRC) errors during the run
    #[error("Decoding failed with {0} CRC errors")]
    StreamIntegrity(u32),

    /// The stream ended before the requested sample count was produced
    #[error("Failed to decode all requested samples ({decoded} of {requested})")]
    IncompleteDecode {
        /// Frames actually written
        decoded: u64,
        /// Frames the header promised
        requested: u64,
    },
}

impl ConvertError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath => ErrorKind::InvalidPath,
            Self::InvalidSampleCount(_) => ErrorKind::InvalidSampleCount,
            Self::InvalidBitDepth(_) => ErrorKind::InvalidBitDepth,
            Self::InputOpen { .. } => ErrorKind::InputOpenFailed,
            Self::DecoderOpen(_) => ErrorKind::DecoderOpenFailed,
            Self::InvalidChannelCount(_) => ErrorKind::InvalidChannelCount,
            Self::InvalidTotalSamples(_) => ErrorKind::InvalidTotalSamples,
            Self::OutputOpen { .. } => ErrorKind::OutputOpenFailed,
            Self::DataSizeOverflow(_) => ErrorKind::DataSizeOverflow,
            Self::HeaderWrite(_) => ErrorKind::HeaderWriteFailed,
            Self::DecodeUnpack(_) => ErrorKind::DecodeUnpackFailed,
            Self::SampleWrite(_) => ErrorKind::SampleWriteFailed,
            Self::StreamIntegrity(_) => ErrorKind::StreamIntegrityErrors,
            Self::IncompleteDecode { .. } => ErrorKind::IncompleteDecode,
        }
    }

    /// Display message truncated to [`MAX_MESSAGE_LEN`] bytes
    pub fn bounded_message(&self) -> String {
        bound_message(&self.to_string())
    }
}

/// Truncate `message` to at most [`MAX_MESSAGE_LEN`] bytes on a char boundary
pub fn bound_message(message: &str) -> String {
    if message.len() <= MAX_MESSAGE_LEN {
        return message.to_string();
    }

    let mut end = MAX_MESSAGE_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}

/// Fieldless classification of a [`ConvertError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`ConvertError::InvalidPath`]
    InvalidPath,
    /// See [`ConvertError::InvalidSampleCount`]
    InvalidSampleCount,
    /// See [`ConvertError::InvalidBitDepth`]
    InvalidBitDepth,
    /// See [`ConvertError::InputOpen`]
    InputOpenFailed,
    /// See [`ConvertError::DecoderOpen`]
    DecoderOpenFailed,
    /// See [`ConvertError::InvalidChannelCount`]
    InvalidChannelCount,
    /// See [`ConvertError::InvalidTotalSamples`]
    InvalidTotalSamples,
    /// See [`ConvertError::OutputOpen`]
    OutputOpenFailed,
    /// See [`ConvertError::DataSizeOverflow`]
    DataSizeOverflow,
    /// See [`ConvertError::HeaderWrite`]
    HeaderWriteFailed,
    /// See [`ConvertError::DecodeUnpack`]
    DecodeUnpackFailed,
    /// See [`ConvertError::SampleWrite`]
    SampleWriteFailed,
    /// See [`ConvertError::StreamIntegrity`]
    StreamIntegrityErrors,
    /// See [`ConvertError::IncompleteDecode`]
    IncompleteDecode,
}

impl ErrorKind {
    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPath => "invalid_path",
            Self::InvalidSampleCount => "invalid_sample_count",
            Self::InvalidBitDepth => "invalid_bit_depth",
            Self::InputOpenFailed => "input_open_failed",
            Self::DecoderOpenFailed => "decoder_open_failed",
            Self::InvalidChannelCount => "invalid_channel_count",
            Self::InvalidTotalSamples => "invalid_total_samples",
            Self::OutputOpenFailed => "output_open_failed",
            Self::DataSizeOverflow => "data_size_overflow",
            Self::HeaderWriteFailed => "header_write_failed",
            Self::DecodeUnpackFailed => "decode_unpack_failed",
            Self::SampleWriteFailed => "sample_write_failed",
            Self::StreamIntegrityErrors => "stream_integrity_errors",
            Self::IncompleteDecode => "incomplete_decode",
        }
    }

    /// Numeric code understood by legacy hosts
    pub fn code(&self) -> u8 {
        match self {
            Self::InvalidPath | Self::InputOpenFailed | Self::OutputOpenFailed => 1,
            Self::DecoderOpenFailed => 2,
            Self::InvalidChannelCount => 4,
            Self::InvalidSampleCount | Self::InvalidTotalSamples => 5,
            Self::DataSizeOverflow => 6,
            Self::HeaderWriteFailed | Self::SampleWriteFailed => 7,
            Self::DecodeUnpackFailed | Self::StreamIntegrityErrors | Self::IncompleteDecode => 8,
            Self::InvalidBitDepth => 9,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a decoder backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct DecoderError(String);

impl DecoderError {
    /// Create a decoder error from a message
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// The underlying decoder message
    pub fn message(&self) -> &str {
        &self.0
    }
}
