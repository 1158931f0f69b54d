//! Sample format conversion
//!
//! Packs decoded 32-bit-wide samples into the little-endian layout of the
//! chosen [`OutputFormat`]. Integer sources arrive right-justified at their
//! source bit depth; float sources arrive as `f32` bit patterns.
//!
//! The 8- and 16-bit integer paths clamp to the int16 range *before*
//! shifting a wider source down. For a 24- or 32-bit source this discards
//! more than a direct rescale would; the behaviour is kept so output stays
//! byte-identical with existing converted libraries.

use wavpipe_core::OutputFormat;

const I16_MIN: i32 = i16::MIN as i32;
const I16_MAX: i32 = i16::MAX as i32;
const I24_MIN: i32 = -8_388_608;
const I24_MAX: i32 = 8_388_607;

/// Convert `src` into `dst`, returning the number of bytes written
///
/// Writes exactly `src.len() * format.bytes_per_sample()` bytes and nothing
/// past them. Allocates nothing.
///
/// # Panics
/// Panics if `dst` is shorter than the packed output.
pub fn format_samples(
    src: &[i32],
    dst: &mut [u8],
    format: OutputFormat,
    is_float: bool,
    source_bits: u32,
) -> usize {
    let len = src.len() * format.bytes_per_sample();
    let dst = &mut dst[..len];

    match format {
        OutputFormat::Unsigned8 => {
            for (out, &sample) in dst.iter_mut().zip(src) {
                *out = to_u8(sample, is_float, source_bits);
            }
        }
        OutputFormat::Signed16 => {
            for (out, &sample) in dst.chunks_exact_mut(2).zip(src) {
                out.copy_from_slice(&to_i16(sample, is_float, source_bits).to_le_bytes());
            }
        }
        OutputFormat::Signed24 => {
            for (out, &sample) in dst.chunks_exact_mut(3).zip(src) {
                out.copy_from_slice(&to_i24(sample, is_float).to_le_bytes()[..3]);
            }
        }
        OutputFormat::Signed32 => {
            for (out, &sample) in dst.chunks_exact_mut(4).zip(src) {
                out.copy_from_slice(&to_i32(sample, is_float).to_le_bytes());
            }
        }
    }

    len
}

/// Reinterpret a float sample's bits and clamp to [-1, 1]
#[inline]
fn unit_float(bits: i32) -> f32 {
    f32::from_bits(bits as u32).clamp(-1.0, 1.0)
}

/// Right shift that brings a source down to 16 bits
#[inline]
fn shift_to_16(source_bits: u32) -> u32 {
    source_bits.saturating_sub(16).min(31)
}

#[inline]
fn to_u8(sample: i32, is_float: bool, source_bits: u32) -> u8 {
    if is_float {
        (unit_float(sample) * 127.0 + 128.0) as u8
    } else {
        let clamped = sample.clamp(I16_MIN, I16_MAX);
        // Wrapping truncation to the low byte
        ((clamped >> shift_to_16(source_bits)) + 128) as u8
    }
}

#[inline]
fn to_i16(sample: i32, is_float: bool, source_bits: u32) -> i16 {
    if is_float {
        (unit_float(sample) * 32767.0) as i16
    } else {
        let clamped = sample.clamp(I16_MIN, I16_MAX);
        if source_bits <= 16 {
            clamped as i16
        } else {
            (clamped >> shift_to_16(source_bits)) as i16
        }
    }
}

/// 24-bit value in the low three bytes of an i32
#[inline]
fn to_i24(sample: i32, is_float: bool) -> i32 {
    if is_float {
        (unit_float(sample) * 8_388_607.0) as i32
    } else {
        sample.clamp(I24_MIN, I24_MAX)
    }
}

#[inline]
fn to_i32(sample: i32, is_float: bool) -> i32 {
    if is_float {
        // 2147483647.0 rounds up to 2^31 in f32; `as` saturates to i32::MAX
        (unit_float(sample) * 2_147_483_647.0) as i32
    } else {
        sample
    }
}
