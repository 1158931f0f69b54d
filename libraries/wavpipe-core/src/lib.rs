//! Wavpipe Core
//!
//! Platform-agnostic types, traits, and error handling for converting a
//! decoded audio stream into an uncompressed PCM WAV file.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Request/stream types**: `DecodeRequest`, `StreamProperties`, `OutputFormat`
//! - **Seams**: `DecoderBackend` opens a `StreamDecoder` from an explicit byte
//!   source; `ProgressSink` receives progress fractions
//! - **Error handling**: `ConvertError`, its fieldless `ErrorKind`, and the
//!   host-facing `DecodeOutcome`
//!
//! # Example
//!
//! ```rust
//! use wavpipe_core::{DecodeRequest, OutputFormat};
//!
//! let request = DecodeRequest::new("/music/take.wv", "/tmp/take.wav")
//!     .with_max_samples(44_100)
//!     .with_bits_per_sample(24);
//!
//! assert_eq!(request.validate().unwrap(), OutputFormat::Signed24);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ConvertError, DecoderError, ErrorKind, Result, MAX_MESSAGE_LEN};
pub use traits::{DecoderBackend, NoProgress, ProgressSink, StreamDecoder};
pub use types::{
    DecodeOutcome, DecodeRequest, DecodeSummary, OutputFormat, StreamProperties,
    DEFAULT_CHUNK_FRAMES, MAX_CHANNELS, UNLIMITED_SAMPLES,
};
