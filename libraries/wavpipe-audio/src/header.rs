//! Canonical 44-byte PCM WAV header

use std::io::{self, Write};
use wavpipe_core::{ConvertError, OutputFormat, Result, StreamProperties};

/// Size of the serialized header
pub const HEADER_LEN: usize = 44;

/// Bytes of header that follow the RIFF size field
const RIFF_OVERHEAD: u32 = 36;

/// Fixed-layout RIFF/WAVE header with a single `fmt ` and `data` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_size: u32,
}

impl WavHeader {
    /// Compute the header for `samples_to_decode` frames of `format`
    ///
    /// # Errors
    /// Returns [`ConvertError::DataSizeOverflow`] if the data chunk does not
    /// fit in 32 bits.
    pub fn new(
        props: &StreamProperties,
        format: OutputFormat,
        samples_to_decode: u64,
    ) -> Result<Self> {
        let channels = u64::from(props.channels);
        let bytes_per_sample = format.bytes_per_sample() as u64;

        let data_size = samples_to_decode
            .checked_mul(channels)
            .and_then(|n| n.checked_mul(bytes_per_sample))
            .unwrap_or(u64::MAX);
        if data_size > u64::from(u32::MAX) {
            return Err(ConvertError::DataSizeOverflow(data_size));
        }

        let block_align = channels * bytes_per_sample;
        // Only absurd sample rates overflow; saturate rather than wrap
        let byte_rate = u32::try_from(u64::from(props.sample_rate) * block_align).unwrap_or(u32::MAX);

        Ok(Self {
            channels: props.channels as u16,
            sample_rate: props.sample_rate,
            byte_rate,
            block_align: block_align as u16,
            bits_per_sample: format.bits_per_sample(),
            data_size: data_size as u32,
        })
    }

    /// RIFF chunk size: total file size minus 8
    ///
    /// Wraps modulo 2^32 when the data chunk is within 36 bytes of the limit.
    pub fn file_size(&self) -> u32 {
        self.data_size.wrapping_add(RIFF_OVERHEAD)
    }

    /// Serialize in little-endian RIFF order
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.file_size().to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");

        // fmt chunk
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&16u32.to_le_bytes()); // Chunk size (16 for PCM)
        out[20..22].copy_from_slice(&1u16.to_le_bytes()); // Audio format (1 = PCM)
        out[22..24].copy_from_slice(&self.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());

        // data chunk
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_size.to_le_bytes());
        out
    }

    /// Write the serialized header in one call
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }

    /// Parse a header produced by [`WavHeader::to_bytes`]
    ///
    /// Returns `None` unless the bytes hold the exact canonical layout.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..HEADER_LEN)?;
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        if bytes[0..4] != *b"RIFF"
            || bytes[8..12] != *b"WAVE"
            || bytes[12..16] != *b"fmt "
            || bytes[36..40] != *b"data"
            || u32_at(16) != 16
            || u16_at(20) != 1
        {
            return None;
        }

        let header = Self {
            channels: u16_at(22),
            sample_rate: u32_at(24),
            byte_rate: u32_at(28),
            block_align: u16_at(32),
            bits_per_sample: u16_at(34),
            data_size: u32_at(40),
        };
        (header.file_size() == u32_at(4)).then_some(header)
    }
}
