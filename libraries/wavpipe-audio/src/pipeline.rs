//! Decode orchestration
//!
//! One call runs the whole lifecycle on the calling thread:
//!
//! ```text
//! Init → OpenInput → ValidateStream → OpenOutput → WriteHeader → Decoding → Success
//!   │        │             │              │             │            │
//!   └────────┴─────────────┴──────────────┴─────────────┴────────────┴──► Failure(kind)
//! ```
//!
//! Every handle and buffer is owned by the call and dropped on every exit
//! path. A failure after the header is written leaves the partial file on
//! disk; nothing is rolled back.

use crate::convert::format_samples;
use crate::header::{WavHeader, HEADER_LEN};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info};
use wavpipe_core::{
    ConvertError, DecodeOutcome, DecodeRequest, DecodeSummary, DecoderBackend, OutputFormat,
    ProgressSink, Result, StreamDecoder, StreamProperties, DEFAULT_CHUNK_FRAMES,
};

/// Largest progress value short of completion
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Stage of a conversion, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    OpenInput,
    ValidateStream,
    OpenOutput,
    WriteHeader,
    Decoding,
}

/// Tunables for the decode loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Frames requested from the decoder per iteration
    pub chunk_frames: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunk_frames: DEFAULT_CHUNK_FRAMES,
        }
    }
}

/// Convert `request.input` to a PCM WAV at `request.output`
///
/// Uses the default chunk size. See [`decode_to_wav_with`].
pub fn decode_to_wav(
    request: &DecodeRequest,
    backend: &dyn DecoderBackend,
    progress: &mut dyn ProgressSink,
) -> Result<DecodeSummary> {
    decode_to_wav_with(request, backend, progress, &PipelineOptions::default())
}

/// Convert with explicit pipeline options
///
/// # Errors
/// Returns the classified [`ConvertError`] for the first failure. Request
/// validation happens before any file is touched.
pub fn decode_to_wav_with(
    request: &DecodeRequest,
    backend: &dyn DecoderBackend,
    progress: &mut dyn ProgressSink,
    options: &PipelineOptions,
) -> Result<DecodeSummary> {
    info!(
        input = %request.input.display(),
        output = %request.output.display(),
        max_samples = request.max_samples,
        bits_per_sample = request.force_bits_per_sample,
        "Starting conversion"
    );

    let result = run(request, backend, progress, options);
    match &result {
        Ok(summary) => info!(
            samples = summary.samples_written,
            bytes = summary.bytes_written,
            "Conversion complete"
        ),
        Err(e) => error!(kind = %e.kind(), "Conversion failed: {}", e),
    }
    result
}

/// Convert and fold the result into the host-facing outcome
pub fn decode_to_outcome(
    request: &DecodeRequest,
    backend: &dyn DecoderBackend,
    progress: &mut dyn ProgressSink,
) -> DecodeOutcome {
    decode_to_wav(request, backend, progress).into()
}

/// Open `path` and report its stream properties without converting
///
/// # Errors
/// Returns an error if the file cannot be opened or the decoder rejects it
pub fn probe(path: &Path, backend: &dyn DecoderBackend) -> Result<StreamProperties> {
    let stream = open_stream(path, backend)?;
    Ok(stream.properties())
}

fn open_stream(path: &Path, backend: &dyn DecoderBackend) -> Result<Box<dyn StreamDecoder>> {
    let source = File::open(path).map_err(|source| ConvertError::InputOpen {
        path: path.to_path_buf(),
        source,
    })?;
    backend
        .open(source, path)
        .map_err(|e| ConvertError::DecoderOpen(e.message().to_string()))
}

fn run(
    request: &DecodeRequest,
    backend: &dyn DecoderBackend,
    progress: &mut dyn ProgressSink,
    options: &PipelineOptions,
) -> Result<DecodeSummary> {
    debug!(stage = ?Stage::Init, "Validating request");
    let format = request.validate()?;
    let chunk_frames = options.chunk_frames.max(1);

    debug!(stage = ?Stage::OpenInput, "Opening input");
    let mut stream = open_stream(&request.input, backend)?;

    debug!(stage = ?Stage::ValidateStream, "Validating stream");
    let props = stream.properties();
    debug!(
        channels = props.channels,
        sample_rate = props.sample_rate,
        bits_per_sample = props.bits_per_sample,
        total_samples = props.total_samples,
        is_float = props.is_float,
        "Stream properties"
    );
    props.validate()?;
    let samples_to_decode = props.samples_to_decode(request.sample_limit());

    debug!(stage = ?Stage::OpenOutput, "Creating output");
    let mut output = File::create(&request.output).map_err(|source| ConvertError::OutputOpen {
        path: request.output.clone(),
        source,
    })?;

    debug!(stage = ?Stage::WriteHeader, "Writing header");
    let header = WavHeader::new(&props, format, samples_to_decode)?;
    header.write_to(&mut output).map_err(ConvertError::HeaderWrite)?;

    debug!(stage = ?Stage::Decoding, samples_to_decode, chunk_frames, "Decoding");
    let decoded = pump(
        stream.as_mut(),
        &mut output,
        &props,
        format,
        samples_to_decode,
        chunk_frames,
        progress,
    )?;

    let crc_errors = stream.error_count();
    if crc_errors > 0 {
        return Err(ConvertError::StreamIntegrity(crc_errors));
    }
    if decoded != samples_to_decode {
        return Err(ConvertError::IncompleteDecode {
            decoded,
            requested: samples_to_decode,
        });
    }

    Ok(DecodeSummary {
        samples_written: decoded,
        channels: header.channels,
        sample_rate: header.sample_rate,
        bits_per_sample: header.bits_per_sample,
        bytes_written: HEADER_LEN as u64 + u64::from(header.data_size),
    })
}

/// Pull, convert, and write chunks until the request is met or the stream ends
///
/// Returns the number of frames written.
fn pump<W: Write>(
    stream: &mut dyn StreamDecoder,
    out: &mut W,
    props: &StreamProperties,
    format: OutputFormat,
    samples_to_decode: u64,
    chunk_frames: usize,
    progress: &mut dyn ProgressSink,
) -> Result<u64> {
    let channels = props.channels as usize;
    let mut decoded = vec![0i32; chunk_frames * channels];
    let mut packed = vec![0u8; chunk_frames * channels * format.bytes_per_sample()];
    let mut total_read: u64 = 0;
    let mut chunks = 0usize;

    while total_read < samples_to_decode {
        let wanted = (samples_to_decode - total_read).min(chunk_frames as u64) as usize;

        let frames = stream
            .unpack(&mut decoded[..wanted * channels])
            .map_err(|e| ConvertError::DecodeUnpack(e.message().to_string()))?;
        if frames == 0 {
            debug!(total_read, samples_to_decode, "Decoder reached end of stream");
            break;
        }
        let frames = frames.min(wanted);
        let samples = frames * channels;

        let len = format_samples(
            &decoded[..samples],
            &mut packed,
            format,
            props.is_float,
            props.bits_per_sample,
        );
        out.write_all(&packed[..len]).map_err(ConvertError::SampleWrite)?;

        total_read += frames as u64;
        chunks += 1;
        progress.report(progress_fraction(total_read, samples_to_decode, stream.error_count()));
    }

    if samples_to_decode == 0 {
        // Header-only request: nothing to pull, but completion is still reported
        progress.report(progress_fraction(0, 0, stream.error_count()));
    }

    debug!(chunks, total_read, "Decode loop finished");
    Ok(total_read)
}

/// Fraction of the request written so far
///
/// Reaches exactly 1.0 only when every frame is written and the stream is
/// clean; anything else stays strictly below it.
fn progress_fraction(done: u64, total: u64, crc_errors: u32) -> f32 {
    if done >= total && crc_errors == 0 {
        return 1.0;
    }
    ((done as f64 / total as f64) as f32).min(BELOW_ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use wavpipe_core::DecoderError;

    /// Endless stream of silent frames
    struct Silence(StreamProperties);

    impl StreamDecoder for Silence {
        fn properties(&self) -> StreamProperties {
            self.0
        }

        fn unpack(&mut self, buffer: &mut [i32]) -> std::result::Result<usize, DecoderError> {
            buffer.fill(0);
            Ok(buffer.len() / self.0.channels as usize)
        }

        fn error_count(&self) -> u32 {
            0
        }
    }

    /// Writer that accepts `limit` bytes and then reports a full disk
    struct FillsUp {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for FillsUp {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit - self.written.len();
            if room == 0 {
                return Err(io::Error::other("no space left on device"));
            }
            let n = buf.len().min(room);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sample_write_failure_stops_the_loop() {
        let props = StreamProperties {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 16,
            total_samples: 400,
            is_float: false,
        };
        let mut stream = Silence(props);
        let header = WavHeader::new(&props, OutputFormat::Signed16, 400).unwrap();

        // Room for the header and exactly one 100-frame chunk
        let mut out = FillsUp {
            written: Vec::new(),
            limit: HEADER_LEN + 200,
        };
        header.write_to(&mut out).unwrap();

        let mut reports = Vec::new();
        let err = pump(
            &mut stream,
            &mut out,
            &props,
            OutputFormat::Signed16,
            400,
            100,
            &mut |f: f32| reports.push(f),
        )
        .unwrap_err();

        assert!(matches!(err, ConvertError::SampleWrite(_)));
        assert_eq!(err.kind(), wavpipe_core::ErrorKind::SampleWriteFailed);
        assert_eq!(reports, vec![0.25]);
        assert_eq!(out.written.len(), HEADER_LEN + 200);
    }

    #[test]
    fn progress_is_exactly_one_on_clean_completion() {
        assert_eq!(progress_fraction(1000, 1000, 0), 1.0);
    }

    #[test]
    fn progress_never_rounds_up_to_one_early() {
        let total = (1u64 << 24) + 1;
        let fraction = progress_fraction(total - 1, total, 0);
        assert!(fraction < 1.0);
        assert!(fraction > 0.99);
    }

    #[test]
    fn progress_stays_below_one_with_crc_errors() {
        assert!(progress_fraction(10, 10, 2) < 1.0);
    }

    #[test]
    fn empty_request_is_complete() {
        assert_eq!(progress_fraction(0, 0, 0), 1.0);
        assert!(progress_fraction(0, 0, 1) < 1.0);
    }

    #[test]
    fn progress_midpoint() {
        assert_eq!(progress_fraction(512, 1024, 0), 0.5);
    }

    #[test]
    fn default_chunk_is_4096_frames() {
        assert_eq!(PipelineOptions::default().chunk_frames, 4096);
    }
}
