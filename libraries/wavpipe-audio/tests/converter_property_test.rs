//! Property-based tests for sample conversion
//!
//! These tests use proptest to verify invariants across many random inputs.

use proptest::prelude::*;
use wavpipe_audio::{format_samples, WavHeader};
use wavpipe_core::{OutputFormat, StreamProperties};

fn any_format() -> impl Strategy<Value = OutputFormat> {
    prop_oneof![
        Just(OutputFormat::Unsigned8),
        Just(OutputFormat::Signed16),
        Just(OutputFormat::Signed24),
        Just(OutputFormat::Signed32),
    ]
}

fn i24_at(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8
}

proptest! {
    /// Property: output length is always samples times byte width
    #[test]
    fn output_length_matches_width(
        samples in prop::collection::vec(any::<i32>(), 0..512),
        format in any_format(),
        is_float in any::<bool>(),
        bits in prop_oneof![Just(8u32), Just(16u32), Just(24u32), Just(32u32)]
    ) {
        let mut dst = vec![0u8; 4 * samples.len() + 8];
        let written = format_samples(&samples, &mut dst, format, is_float, bits);
        prop_assert_eq!(written, samples.len() * format.bytes_per_sample());
    }

    /// Property: floats far outside [-1, 1] still land inside the 24-bit range
    #[test]
    fn floats_never_exceed_full_scale(values in prop::collection::vec(-100.0f32..100.0, 1..256)) {
        let src: Vec<i32> = values.iter().map(|v| v.to_bits() as i32).collect();
        let mut dst = vec![0u8; src.len() * 3];
        format_samples(&src, &mut dst, OutputFormat::Signed24, true, 32);

        for chunk in dst.chunks_exact(3) {
            let v = i24_at(chunk);
            prop_assert!((-8_388_607..=8_388_607).contains(&v));
        }
    }

    /// Property: float conversion preserves the sign of the input
    #[test]
    fn float_sign_is_preserved(values in prop::collection::vec(-1.0f32..=1.0, 1..256)) {
        let src: Vec<i32> = values.iter().map(|v| v.to_bits() as i32).collect();
        let mut dst = vec![0u8; src.len() * 4];
        format_samples(&src, &mut dst, OutputFormat::Signed32, true, 32);

        for (value, chunk) in values.iter().zip(dst.chunks_exact(4)) {
            let out = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            if *value > 0.0 {
                prop_assert!(out >= 0);
            } else if *value < 0.0 {
                prop_assert!(out <= 0);
            }
        }
    }

    /// Property: converting the same chunk twice gives identical bytes
    #[test]
    fn conversion_is_deterministic(
        samples in prop::collection::vec(any::<i32>(), 0..256),
        format in any_format(),
        is_float in any::<bool>()
    ) {
        let mut first = vec![0u8; samples.len() * 4];
        let mut second = vec![0xFFu8; samples.len() * 4];
        let n = format_samples(&samples, &mut first, format, is_float, 24);
        let m = format_samples(&samples, &mut second, format, is_float, 24);
        prop_assert_eq!(n, m);
        prop_assert_eq!(&first[..n], &second[..m]);
    }

    /// Property: float to 16-bit is monotone in the input
    #[test]
    fn float_to_sixteen_bit_is_monotone(a in -1.0f32..=1.0, b in -1.0f32..=1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let src = [lo.to_bits() as i32, hi.to_bits() as i32];
        let mut dst = [0u8; 4];
        format_samples(&src, &mut dst, OutputFormat::Signed16, true, 32);

        let lo_out = i16::from_le_bytes([dst[0], dst[1]]);
        let hi_out = i16::from_le_bytes([dst[2], dst[3]]);
        prop_assert!(lo_out <= hi_out);
    }

    /// Property: 16-bit integers survive a 16-bit conversion unchanged
    #[test]
    fn sixteen_bit_integers_are_lossless(samples in prop::collection::vec(any::<i16>(), 1..512)) {
        let src: Vec<i32> = samples.iter().map(|&s| i32::from(s)).collect();
        let mut dst = vec![0u8; src.len() * 2];
        format_samples(&src, &mut dst, OutputFormat::Signed16, false, 16);

        let back: Vec<i16> = dst.chunks_exact(2).map(|b| i16::from_le_bytes([b[0], b[1]])).collect();
        prop_assert_eq!(back, samples);
    }

    /// Property: 24-bit integers survive a 24-bit conversion unchanged
    #[test]
    fn twenty_four_bit_integers_are_lossless(
        samples in prop::collection::vec(-8_388_608i32..=8_388_607, 1..512)
    ) {
        let mut dst = vec![0u8; samples.len() * 3];
        format_samples(&samples, &mut dst, OutputFormat::Signed24, false, 24);

        let back: Vec<i32> = dst.chunks_exact(3).map(i24_at).collect();
        prop_assert_eq!(back, samples);
    }

    /// Property: header sizes are consistent whenever they fit
    #[test]
    fn header_sizes_are_consistent(
        channels in 1u32..=100,
        sample_rate in 8000u32..=384_000,
        frames in 0u64..=50_000_000,
        format in any_format()
    ) {
        let props = StreamProperties {
            channels,
            sample_rate,
            bits_per_sample: 16,
            total_samples: frames.max(1),
            is_float: false,
        };
        let expected = frames * u64::from(channels) * format.bytes_per_sample() as u64;

        match WavHeader::new(&props, format, frames) {
            Ok(header) => {
                prop_assert_eq!(u64::from(header.data_size), expected);
                prop_assert_eq!(header.file_size(), header.data_size.wrapping_add(36));
                prop_assert_eq!(u32::from(header.block_align), channels * format.bytes_per_sample() as u32);
                prop_assert_eq!(WavHeader::parse(&header.to_bytes()), Some(header));
            }
            Err(_) => prop_assert!(expected > u64::from(u32::MAX)),
        }
    }
}
