/// Request, stream, and outcome types
use crate::error::{bound_message, ConvertError, ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `max_samples` value meaning "decode everything"
pub const UNLIMITED_SAMPLES: i64 = -1;

/// Highest channel count accepted from a decoder
pub const MAX_CHANNELS: u32 = 100;

/// Frames pulled from the decoder per iteration unless configured otherwise
pub const DEFAULT_CHUNK_FRAMES: usize = 4096;

/// Packed sample layout written to the data chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Unsigned 8-bit, centered on 128
    Unsigned8,
    /// Signed 16-bit little-endian
    #[default]
    Signed16,
    /// Signed 24-bit little-endian, packed without padding
    Signed24,
    /// Signed 32-bit little-endian
    Signed32,
}

impl OutputFormat {
    /// Resolve a forced bit depth; 0 selects the 16-bit default
    pub fn from_forced_bits(bits: u32) -> Option<Self> {
        match bits {
            0 | 16 => Some(Self::Signed16),
            8 => Some(Self::Unsigned8),
            24 => Some(Self::Signed24),
            32 => Some(Self::Signed32),
            _ => None,
        }
    }

    /// Bytes per sample (per channel)
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Unsigned8 => 1,
            Self::Signed16 => 2,
            Self::Signed24 => 3,
            Self::Signed32 => 4,
        }
    }

    /// Bits per sample as written to the header
    pub fn bits_per_sample(self) -> u16 {
        self.bytes_per_sample() as u16 * 8
    }
}

/// One conversion job as requested by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeRequest {
    /// Compressed input file
    pub input: PathBuf,

    /// WAV file to create (truncated if it exists)
    pub output: PathBuf,

    /// Frame cap, or [`UNLIMITED_SAMPLES`]
    pub max_samples: i64,

    /// 0 for the 16-bit default, else 8, 16, 24, or 32
    pub force_bits_per_sample: u32,
}

impl DecodeRequest {
    /// Create an unlimited, default-depth request
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            max_samples: UNLIMITED_SAMPLES,
            force_bits_per_sample: 0,
        }
    }

    /// Cap the number of frames written
    #[must_use]
    pub fn with_max_samples(mut self, max_samples: i64) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Force the output bit depth
    #[must_use]
    pub fn with_bits_per_sample(mut self, bits: u32) -> Self {
        self.force_bits_per_sample = bits;
        self
    }

    /// Check the request without touching the filesystem
    ///
    /// Returns the output format the request resolves to.
    pub fn validate(&self) -> Result<OutputFormat> {
        if self.input.as_os_str().is_empty() || self.output.as_os_str().is_empty() {
            return Err(ConvertError::InvalidPath);
        }
        if self.max_samples < UNLIMITED_SAMPLES {
            return Err(ConvertError::InvalidSampleCount(self.max_samples));
        }
        OutputFormat::from_forced_bits(self.force_bits_per_sample)
            .ok_or(ConvertError::InvalidBitDepth(self.force_bits_per_sample))
    }

    /// Frame cap, `None` when unlimited
    pub fn sample_limit(&self) -> Option<u64> {
        u64::try_from(self.max_samples).ok()
    }
}

/// Properties reported by an opened decoder stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamProperties {
    /// Interleaved channel count
    pub channels: u32,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Source bit depth of integer samples
    pub bits_per_sample: u32,

    /// Frames in the stream (per-channel sample count)
    pub total_samples: u64,

    /// Samples are f32 bit patterns rather than integers
    pub is_float: bool,
}

impl StreamProperties {
    /// Reject corrupt channel counts and empty streams
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(ConvertError::InvalidChannelCount(self.channels));
        }
        if self.total_samples == 0 {
            return Err(ConvertError::InvalidTotalSamples(self.total_samples));
        }
        Ok(())
    }

    /// Frames to decode given an optional cap
    pub fn samples_to_decode(&self, limit: Option<u64>) -> u64 {
        match limit {
            Some(limit) => self.total_samples.min(limit),
            None => self.total_samples,
        }
    }
}

/// What a successful conversion produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSummary {
    /// Frames written to the data chunk
    pub samples_written: u64,
    /// Channels in the output
    pub channels: u16,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Output bit depth
    pub bits_per_sample: u16,
    /// Header plus data bytes
    pub bytes_written: u64,
}

/// Host-facing result of one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecodeOutcome {
    /// The WAV file is complete
    Success(DecodeSummary),

    /// The conversion failed
    Failure {
        /// Classification of the first failure
        kind: ErrorKind,
        /// Error message, at most 79 bytes
        message: String,
    },
}

impl DecodeOutcome {
    /// Build a failure with a bounded message
    pub fn failure(kind: ErrorKind, message: &str) -> Self {
        Self::Failure {
            kind,
            message: bound_message(message),
        }
    }

    /// Whether the conversion succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Failure kind, if any
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<Result<DecodeSummary>> for DecodeOutcome {
    fn from(result: Result<DecodeSummary>) -> Self {
        match result {
            Ok(summary) => Self::Success(summary),
            Err(err) => Self::Failure {
                kind: err.kind(),
                message: err.bounded_message(),
            },
        }
    }
}

impl std::fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success(_) => f.write_str("Success"),
            Self::Failure { message, .. } => f.write_str(message),
        }
    }
}
