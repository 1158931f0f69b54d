/// Decoder backend built on Symphonia
use std::collections::VecDeque;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::{Sample, SampleFormat};
use tracing::{debug, warn};
use wavpipe_core::{DecoderBackend, DecoderError, StreamDecoder, StreamProperties};

/// Opens any stream Symphonia can demux and decode
///
/// Supports: FLAC, WAV, AIFF, ALAC, MP3, Vorbis, and the other codecs
/// enabled in Symphonia's feature set.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaBackend;

impl SymphoniaBackend {
    /// Create a new backend
    pub fn new() -> Self {
        Self
    }
}

impl DecoderBackend for SymphoniaBackend {
    fn open(&self, source: File, path: &Path) -> Result<Box<dyn StreamDecoder>, DecoderError> {
        Ok(Box::new(SymphoniaStream::open(source, path)?))
    }
}

/// How decoded buffers map onto the stream's sample representation
#[derive(Debug, Default)]
struct Layout {
    /// First buffer has been seen and the properties are settled
    primed: bool,
    /// Right shift undoing Symphonia's left-justification of 32-bit buffers
    shift: u32,
}

/// One open Symphonia stream
///
/// Decoded packets are interleaved into a queue of `i32` samples that
/// [`StreamDecoder::unpack`] drains in whole frames.
pub struct SymphoniaStream {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    properties: StreamProperties,
    layout: Layout,
    pending: VecDeque<i32>,
    errors: u32,
    exhausted: bool,
}

impl SymphoniaStream {
    /// Probe `source` and decode up to the first audio packet
    ///
    /// The first packet settles properties the container may not declare
    /// (channel count, bit depth, float vs. integer).
    ///
    /// # Errors
    /// Returns an error if the source cannot be probed or has no decodable track
    pub fn open(source: File, path: &Path) -> Result<Self, DecoderError> {
        let mss = MediaSourceStream::new(Box::new(source), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| DecoderError::new(format!("Failed to probe stream: {}", e)))?;
        let format = probed.format;

        let (track_id, params) = {
            let track = format
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
                .ok_or_else(|| DecoderError::new("No audio tracks found"))?;
            (track.id, track.codec_params.clone())
        };

        let decoder = symphonia::default::get_codecs()
            .make(&params, &DecoderOptions::default())
            .map_err(|e| DecoderError::new(format!("Failed to create decoder: {}", e)))?;

        let properties = StreamProperties {
            channels: params.channels.map(|c| c.count() as u32).unwrap_or(0),
            sample_rate: params.sample_rate.unwrap_or(0),
            bits_per_sample: params.bits_per_sample.unwrap_or(0),
            // Streams without a declared length report 0 and fail validation
            total_samples: params.n_frames.unwrap_or(0),
            is_float: matches!(params.sample_format, Some(SampleFormat::F32 | SampleFormat::F64)),
        };

        let mut stream = Self {
            format,
            decoder,
            track_id,
            properties,
            layout: Layout::default(),
            pending: VecDeque::new(),
            errors: 0,
            exhausted: false,
        };

        while !stream.layout.primed && !stream.exhausted {
            stream.decode_next()?;
        }
        debug!(properties = ?stream.properties, shift = stream.layout.shift, "Opened Symphonia stream");

        Ok(stream)
    }

    /// Read and decode one packet into the pending queue
    fn decode_next(&mut self) -> Result<(), DecoderError> {
        let packet = match self.format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.exhausted = true;
                return Ok(());
            }
            Err(SymphoniaError::ResetRequired) => {
                self.decoder.reset();
                return Ok(());
            }
            Err(e) => return Err(DecoderError::new(format!("Error reading packet: {}", e))),
        };

        // Skip packets that are not for our track
        if packet.track_id() != self.track_id {
            return Ok(());
        }

        match self.decoder.decode(&packet) {
            Ok(decoded) => absorb(
                &decoded,
                &mut self.properties,
                &mut self.layout,
                &mut self.pending,
            ),
            Err(SymphoniaError::DecodeError(msg)) => {
                // Corrupt packets are skipped and counted against stream integrity
                self.errors += 1;
                warn!(errors = self.errors, "Skipping corrupt packet: {}", msg);
                Ok(())
            }
            Err(e) => Err(DecoderError::new(format!("Decode error: {}", e))),
        }
    }
}

impl StreamDecoder for SymphoniaStream {
    fn properties(&self) -> StreamProperties {
        self.properties
    }

    fn unpack(&mut self, buffer: &mut [i32]) -> Result<usize, DecoderError> {
        let channels = self.properties.channels as usize;
        if channels == 0 {
            return Ok(0);
        }

        let wanted = buffer.len() / channels * channels;
        while self.pending.len() < wanted && !self.exhausted {
            self.decode_next()?;
        }

        let available = self.pending.len().min(wanted);
        for (slot, sample) in buffer.iter_mut().zip(self.pending.drain(..available)) {
            *slot = sample;
        }
        Ok(available / channels)
    }

    fn error_count(&self) -> u32 {
        self.errors
    }
}

/// Natural width of a decoded buffer's sample type
fn native_bits(decoded: &AudioBufferRef<'_>) -> u32 {
    match decoded {
        AudioBufferRef::U8(_) | AudioBufferRef::S8(_) => 8,
        AudioBufferRef::U16(_) | AudioBufferRef::S16(_) => 16,
        AudioBufferRef::U24(_) | AudioBufferRef::S24(_) => 24,
        AudioBufferRef::U32(_)
        | AudioBufferRef::S32(_)
        | AudioBufferRef::F32(_)
        | AudioBufferRef::F64(_) => 32,
    }
}

/// Append a decoded buffer to `pending` as interleaved, right-justified samples
fn absorb(
    decoded: &AudioBufferRef<'_>,
    props: &mut StreamProperties,
    layout: &mut Layout,
    pending: &mut VecDeque<i32>,
) -> Result<(), DecoderError> {
    let channels = decoded.spec().channels.count() as u32;

    if !layout.primed {
        let native = native_bits(decoded);
        if props.channels == 0 {
            props.channels = channels;
        }
        if props.bits_per_sample == 0 {
            props.bits_per_sample = native;
        }
        props.is_float = matches!(decoded, AudioBufferRef::F32(_) | AudioBufferRef::F64(_));
        // Symphonia widens narrower integer codecs into full-scale 32-bit buffers
        layout.shift = if native == 32 && !props.is_float {
            32u32.saturating_sub(props.bits_per_sample)
        } else {
            0
        };
        layout.primed = true;
    }

    if channels != props.channels {
        return Err(DecoderError::new(format!(
            "Channel count changed mid-stream ({} -> {})",
            props.channels, channels
        )));
    }

    let shift = layout.shift;
    match decoded {
        AudioBufferRef::U8(buf) => interleave(buf, pending, |s| i32::from(s) - 128),
        AudioBufferRef::U16(buf) => interleave(buf, pending, |s| i32::from(s) - 32_768),
        AudioBufferRef::U24(buf) => interleave(buf, pending, |s| s.inner() as i32 - 8_388_608),
        AudioBufferRef::U32(buf) => {
            interleave(buf, pending, |s| ((i64::from(s) - (1 << 31)) as i32) >> shift)
        }
        AudioBufferRef::S8(buf) => interleave(buf, pending, i32::from),
        AudioBufferRef::S16(buf) => interleave(buf, pending, i32::from),
        AudioBufferRef::S24(buf) => interleave(buf, pending, |s| s.inner()),
        AudioBufferRef::S32(buf) => interleave(buf, pending, |s| s >> shift),
        AudioBufferRef::F32(buf) => interleave(buf, pending, |s| s.to_bits() as i32),
        AudioBufferRef::F64(buf) => interleave(buf, pending, |s| (s as f32).to_bits() as i32),
    }
    Ok(())
}

/// Interleave planar channels into `out`
fn interleave<T, F>(buf: &AudioBuffer<T>, out: &mut VecDeque<i32>, map: F)
where
    T: Sample + Copy,
    F: Fn(T) -> i32,
{
    let channels = buf.spec().channels.count();
    out.reserve(buf.frames() * channels);
    for frame in 0..buf.frames() {
        for ch in 0..channels {
            out.push_back(map(buf.chan(ch)[frame]));
        }
    }
}
