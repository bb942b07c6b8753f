//! End-to-end parse and decode tests
//!
//! Files on disk go through `wav::parse` and `decode_into_buffer`, and the
//! buffer contents are checked against the widening/narrowing laws.

mod helpers;

use helpers::{canonical_header, ramp_16, write_hound_wav_16, write_raw_wav, FixtureDir};
use std::fs::File;
use std::io::BufReader;
use widget_ap::audio::{decode_into_buffer, ensure_complete, wav, SampleWidth, StereoSample};
use widget_ap::error::DecodeError;

#[test]
fn test_48k_16_bit_100_samples_both_widths() {
    let dir = FixtureDir::new();
    let path = dir.path("ramp.wav");
    let source = ramp_16(100);
    write_hound_wav_16(&path, 48_000, &source);

    for (width, shift) in [(SampleWidth::Three, 8), (SampleWidth::Four, 16)] {
        let mut reader = BufReader::new(File::open(&path).unwrap());
        let format = wav::parse(&mut reader).unwrap();
        assert_eq!(format.sample_rate, 48_000);
        assert_eq!(format.num_samples, 100);

        let (buffer, decoded) = decode_into_buffer(&mut reader, &format, width).unwrap();
        assert_eq!(decoded, 100);
        ensure_complete(&format, decoded).unwrap();

        let expected: Vec<StereoSample> = source
            .iter()
            .map(|&(l, r)| StereoSample::new(i32::from(l) << shift, i32::from(r) << shift))
            .collect();
        assert_eq!(buffer.samples(), expected.as_slice(), "{} target", width);
    }
}

#[test]
fn test_24_bit_file_decodes_to_identity_and_shift() {
    let dir = FixtureDir::new();
    let path = dir.path("ramp24.wav");
    let values = [0x7F_FFFF, -0x80_0000, 0x01_0203, -2, 0];
    let mut data = Vec::new();
    for &v in &values {
        data.extend_from_slice(&i32::to_le_bytes(v)[..3]);
        data.extend_from_slice(&i32::to_le_bytes(-v / 2)[..3]);
    }
    write_raw_wav(&path, &canonical_header(88_200, 24, values.len() as u32), &data);

    let mut reader = BufReader::new(File::open(&path).unwrap());
    let format = wav::parse(&mut reader).unwrap();
    let (three, _) = decode_into_buffer(&mut reader, &format, SampleWidth::Three).unwrap();

    let mut reader = BufReader::new(File::open(&path).unwrap());
    let format = wav::parse(&mut reader).unwrap();
    let (four, _) = decode_into_buffer(&mut reader, &format, SampleWidth::Four).unwrap();

    for (i, &v) in values.iter().enumerate() {
        assert_eq!(three.samples()[i], StereoSample::new(v, -v / 2));
        assert_eq!(four.samples()[i], StereoSample::new(v << 8, (-v / 2) << 8));
    }
}

#[test]
fn test_32_bit_file_narrows_to_three_bytes() {
    let dir = FixtureDir::new();
    let path = dir.path("ramp32.wav");
    let values = [i32::MAX, i32::MIN, 0x0000_01FF, -1];
    let mut data = Vec::new();
    for &v in &values {
        data.extend_from_slice(&v.to_le_bytes());
        data.extend_from_slice(&v.to_le_bytes());
    }
    write_raw_wav(&path, &canonical_header(192_000, 32, values.len() as u32), &data);

    let mut reader = BufReader::new(File::open(&path).unwrap());
    let format = wav::parse(&mut reader).unwrap();
    let (buffer, _) = decode_into_buffer(&mut reader, &format, SampleWidth::Three).unwrap();

    let got: Vec<i32> = buffer.samples().iter().map(|s| s.left).collect();
    assert_eq!(got, vec![0x7F_FFFF, -0x80_0000, 0x1, -1]);
}

#[test]
fn test_short_file_is_short_read() {
    let dir = FixtureDir::new();
    let path = dir.path("truncated.wav");
    // Header declares 100 samples, only 60 and a half are present
    let data = vec![0x11u8; 60 * 4 + 2];
    write_raw_wav(&path, &canonical_header(48_000, 16, 100), &data);

    let mut reader = BufReader::new(File::open(&path).unwrap());
    let format = wav::parse(&mut reader).unwrap();
    let (buffer, decoded) = decode_into_buffer(&mut reader, &format, SampleWidth::Four).unwrap();

    assert_eq!(decoded, 60);
    assert_eq!(buffer.valid_count(), 60);
    assert_eq!(
        ensure_complete(&format, decoded),
        Err(DecodeError::ShortRead {
            expected: 100,
            actual: 60
        })
    );
}
