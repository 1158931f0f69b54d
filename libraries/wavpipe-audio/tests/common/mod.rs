//! Common test utilities and fixtures
#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};
use wavpipe_audio::{WavHeader, HEADER_LEN};
use wavpipe_core::{DecoderBackend, DecoderError, StreamDecoder, StreamProperties};

/// Backend that replays a fixed sample script instead of decoding bytes
#[derive(Debug, Clone)]
pub struct ScriptedBackend {
    pub properties: StreamProperties,
    /// Interleaved samples the stream will deliver
    pub samples: Vec<i32>,
    /// Integrity errors reported by the stream
    pub crc_errors: u32,
    /// Frame position at which `unpack` starts failing
    pub fail_at_frame: Option<u64>,
    /// Message returned from `open` instead of a stream
    pub open_error: Option<String>,
    /// Cap on frames delivered per `unpack` call
    pub max_frames_per_call: Option<usize>,
}

impl ScriptedBackend {
    /// Stream whose sample script covers exactly `total_samples` frames
    pub fn new(properties: StreamProperties) -> Self {
        let len = properties.total_samples as usize * properties.channels as usize;
        let samples = (0..len).map(|i| (i % 2000) as i32 - 1000).collect();
        Self {
            properties,
            samples,
            crc_errors: 0,
            fail_at_frame: None,
            open_error: None,
            max_frames_per_call: None,
        }
    }

    /// Stream that declares `properties` but holds no samples
    pub fn without_samples(properties: StreamProperties) -> Self {
        Self {
            properties,
            samples: Vec::new(),
            crc_errors: 0,
            fail_at_frame: None,
            open_error: None,
            max_frames_per_call: None,
        }
    }

    pub fn with_properties(mut self, properties: StreamProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_samples(mut self, samples: Vec<i32>) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_crc_errors(mut self, crc_errors: u32) -> Self {
        self.crc_errors = crc_errors;
        self
    }

    pub fn failing_at(mut self, frame: u64) -> Self {
        self.fail_at_frame = Some(frame);
        self
    }

    pub fn failing_open(mut self, message: &str) -> Self {
        self.open_error = Some(message.to_string());
        self
    }

    pub fn with_max_frames_per_call(mut self, frames: usize) -> Self {
        self.max_frames_per_call = Some(frames);
        self
    }
}

impl DecoderBackend for ScriptedBackend {
    fn open(&self, _source: File, _path: &Path) -> Result<Box<dyn StreamDecoder>, DecoderError> {
        if let Some(message) = &self.open_error {
            return Err(DecoderError::new(message.clone()));
        }
        Ok(Box::new(ScriptedStream {
            script: self.clone(),
            position: 0,
        }))
    }
}

pub struct ScriptedStream {
    script: ScriptedBackend,
    position: u64,
}

impl StreamDecoder for ScriptedStream {
    fn properties(&self) -> StreamProperties {
        self.script.properties
    }

    fn unpack(&mut self, buffer: &mut [i32]) -> Result<usize, DecoderError> {
        let channels = self.script.properties.channels as usize;
        if channels == 0 {
            return Ok(0);
        }
        if let Some(frame) = self.script.fail_at_frame {
            if self.position >= frame {
                return Err(DecoderError::new("corrupt block"));
            }
        }

        let start = self.position as usize * channels;
        let remaining = self.script.samples.len().saturating_sub(start) / channels;
        let mut frames = (buffer.len() / channels).min(remaining);
        if let Some(cap) = self.script.max_frames_per_call {
            frames = frames.min(cap);
        }

        let end = start + frames * channels;
        buffer[..frames * channels].copy_from_slice(&self.script.samples[start..end]);
        self.position += frames as u64;
        Ok(frames)
    }

    fn error_count(&self) -> u32 {
        self.script.crc_errors
    }
}

/// Integer stream properties
pub fn props(channels: u32, sample_rate: u32, bits: u32, total_samples: u64) -> StreamProperties {
    StreamProperties {
        channels,
        sample_rate,
        bits_per_sample: bits,
        total_samples,
        is_float: false,
    }
}

/// Create a placeholder input file; scripted backends ignore its contents
pub fn touch_input(dir: &Path) -> PathBuf {
    let path = dir.join("input.wv");
    std::fs::write(&path, b"wvpk").expect("Failed to create input file");
    path
}

/// Read a converted file back as (header, data bytes)
pub fn read_output(path: &Path) -> (WavHeader, Vec<u8>) {
    let bytes = std::fs::read(path).expect("Failed to read output file");
    let header = WavHeader::parse(&bytes).expect("Output does not start with a canonical header");
    (header, bytes[HEADER_LEN..].to_vec())
}

/// Little-endian i16 samples
pub fn i16s(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}
