// Unit tests for the audio codec utilities
//
// These cover the lossy PCM quantization round-trip, malformed payload
// handling, and the base64 helpers.

use sona_meet::audio::codec::{decode_blob, decode_bytes, encode_bytes, encode_frame};

const QUANT_TOLERANCE: f32 = 1.0 / 32768.0 + 1e-6;

#[test]
fn test_encode_decode_round_trip_within_quantization_error() {
    let samples = vec![0.0, 0.25, -0.25, 0.5, -0.5, 1.0, -1.0, 0.123, -0.321];

    let blob = encode_frame(&samples, 16000);
    let decoded = decode_blob(&blob.data, 16000).expect("decode should succeed");

    assert_eq!(decoded.samples.len(), samples.len());
    for (original, recovered) in samples.iter().zip(decoded.samples.iter()) {
        assert!(
            (original - recovered).abs() <= QUANT_TOLERANCE,
            "sample {} decoded as {} (error {})",
            original,
            recovered,
            (original - recovered).abs()
        );
    }
}

#[test]
fn test_encode_clamps_out_of_range_samples() {
    let blob = encode_frame(&[2.0, -3.0], 16000);
    let decoded = decode_blob(&blob.data, 16000).expect("decode should succeed");

    assert!(
        (decoded.samples[0] - 32767.0 / 32768.0).abs() < 1e-6,
        "over-range sample should clamp to full scale"
    );
    assert!(
        (decoded.samples[1] + 32767.0 / 32768.0).abs() < 1e-6,
        "under-range sample should clamp to negative full scale"
    );
}

#[test]
fn test_blob_is_tagged_with_pcm_mime_and_rate() {
    let blob = encode_frame(&[0.0], 16000);
    assert_eq!(blob.mime_type, "audio/pcm;rate=16000");

    let blob = encode_frame(&[0.0], 24000);
    assert_eq!(blob.mime_type, "audio/pcm;rate=24000");
}

#[test]
fn test_decode_truncates_odd_length_payload() {
    // Three bytes: one complete little-endian sample plus a dangling byte
    let payload = encode_bytes(&[0x00, 0x01, 0xAB]);

    let decoded = decode_blob(&payload, 24000).expect("odd payload should not error");

    assert_eq!(decoded.samples.len(), 1, "trailing byte should be dropped");
    assert!((decoded.samples[0] - 256.0 / 32768.0).abs() < 1e-6);
}

#[test]
fn test_decode_empty_payload_yields_empty_buffer() {
    let decoded = decode_blob("", 24000).expect("empty payload should not error");
    assert!(decoded.is_empty());
    assert_eq!(decoded.sample_rate, 24000);
}

#[test]
fn test_encode_empty_block() {
    let blob = encode_frame(&[], 16000);
    assert!(blob.data.is_empty());
}

#[test]
fn test_base64_helpers_round_trip_exactly() {
    let bytes: Vec<u8> = (0..=255).collect();
    let encoded = encode_bytes(&bytes);
    let decoded = decode_bytes(&encoded).expect("decode should succeed");
    assert_eq!(decoded, bytes, "round-trip must be byte-for-byte stable");
}

#[test]
fn test_decode_bytes_rejects_invalid_base64() {
    assert!(decode_bytes("not!base64!!").is_err());
}

#[test]
fn test_buffer_duration() {
    let samples = vec![0.0f32; 2400];
    let blob = encode_frame(&samples, 24000);
    let decoded = decode_blob(&blob.data, 24000).expect("decode should succeed");
    assert!(
        (decoded.duration_secs() - 0.1).abs() < 1e-9,
        "2400 samples at 24kHz should be 100ms"
    );
}
