/// Decoder and progress seams
use crate::error::DecoderError;
use crate::types::StreamProperties;
use std::fs::File;
use std::path::Path;

/// One opened, decoded audio stream
///
/// Samples are delivered channel-interleaved, one `i32` per channel sample.
/// Integer sources are right-justified at `bits_per_sample`; float sources
/// carry the bit pattern of an `f32` in `[-1.0, 1.0]`.
pub trait StreamDecoder {
    /// Properties of the stream; fixed for the stream's lifetime
    fn properties(&self) -> StreamProperties;

    /// Fill `buffer` with up to `buffer.len() / channels` frames
    ///
    /// Returns the number of frames written, `0` once the stream is exhausted.
    ///
    /// # Errors
    /// Returns an error if the decoder cannot unpack the next block
    fn unpack(&mut self, buffer: &mut [i32]) -> Result<usize, DecoderError>;

    /// Integrity (CRC) errors counted so far
    fn error_count(&self) -> u32;
}

/// Opens decoder streams from an explicit byte source
///
/// The source handle is owned by the returned stream, so concurrent
/// conversions never share reader state.
pub trait DecoderBackend: Send + Sync {
    /// Open a stream over `source`; `path` is a format hint only
    ///
    /// # Errors
    /// Returns the decoder's message if the source is not a decodable stream
    fn open(&self, source: File, path: &Path) -> Result<Box<dyn StreamDecoder>, DecoderError>;
}

/// Receives conversion progress
///
/// Called synchronously on the converting thread, once per chunk, with
/// non-decreasing fractions in `[0.0, 1.0]`.
pub trait ProgressSink {
    /// Report the fraction of requested frames written so far
    fn report(&mut self, fraction: f32);
}

impl<F: FnMut(f32)> ProgressSink for F {
    fn report(&mut self, fraction: f32) {
        self(fraction);
    }
}

/// Progress sink that discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _fraction: f32) {}
}
