//! Wavpipe Audio
//!
//! Turns a decoded audio stream into an uncompressed PCM WAV file.
//!
//! This crate provides:
//! - Sample packing into 8-bit unsigned or 16/24/32-bit signed PCM
//! - Canonical 44-byte WAV header synthesis with 32-bit overflow checks
//! - The chunked decode pipeline with progress reporting
//! - A Symphonia-backed decoder (FLAC, WAV, AIFF, ALAC, MP3, Vorbis, ...)
//! - Background conversion jobs with a progress channel
//!
//! # Example: Converting a File
//!
//! ```rust,no_run
//! use wavpipe_audio::{decode_to_wav, SymphoniaBackend};
//! use wavpipe_core::DecodeRequest;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = DecodeRequest::new("/music/take.flac", "/tmp/take.wav").with_bits_per_sample(24);
//!
//! let mut progress = |fraction: f32| println!("{:.0}%", fraction * 100.0);
//! let summary = decode_to_wav(&request, &SymphoniaBackend::new(), &mut progress)?;
//!
//! println!("Wrote {} frames ({} bytes)", summary.samples_written, summary.bytes_written);
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Converting in the Background
//!
//! ```rust,no_run
//! use wavpipe_audio::{spawn_decode, PipelineOptions, SymphoniaBackend};
//! use wavpipe_core::DecodeRequest;
//!
//! # fn example() -> std::io::Result<()> {
//! let request = DecodeRequest::new("/music/take.flac", "/tmp/take.wav");
//! let job = spawn_decode(request, SymphoniaBackend::new(), PipelineOptions::default())?;
//!
//! for fraction in job.progress().iter() {
//!     eprintln!("{:.0}%", fraction * 100.0);
//! }
//! println!("{}", job.join());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod convert;
mod decoder;
pub mod header;
mod job;
pub mod pipeline;

pub use convert::format_samples;
pub use decoder::{SymphoniaBackend, SymphoniaStream};
pub use header::{WavHeader, HEADER_LEN};
pub use job::{spawn_decode, DecodeJob};
pub use pipeline::{
    decode_to_outcome, decode_to_wav, decode_to_wav_with, probe, PipelineOptions, Stage,
};
