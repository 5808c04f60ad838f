use anyhow::{Context, Result};
use base64::Engine;

/// A decoded block of float audio samples at a known sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Samples in [-1.0, 1.0], mono
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A transport-ready media payload: base64 data plus its mime type
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlob {
    pub mime_type: String,
    pub data: String,
}

/// Encode a block of float samples as base64 16-bit little-endian PCM
///
/// Each sample is clamped to [-1.0, 1.0] and scaled by 32767. The blob is
/// tagged with the PCM mime type carrying the sample rate, which is the
/// shape the live agent expects for realtime audio input.
pub fn encode_frame(samples: &[f32], sample_rate: u32) -> MediaBlob {
    let mut pcm_bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let value = (clamped * 32767.0).round() as i16;
        pcm_bytes.extend_from_slice(&value.to_le_bytes());
    }

    MediaBlob {
        mime_type: format!("audio/pcm;rate={}", sample_rate),
        data: base64::engine::general_purpose::STANDARD.encode(&pcm_bytes),
    }
}

/// Decode a base64 16-bit little-endian PCM payload into float samples
///
/// A trailing odd byte is truncated rather than treated as an error, and an
/// empty payload decodes to an empty buffer. Samples are divided by 32768,
/// so the output stays within [-1.0, 1.0).
pub fn decode_blob(data: &str, sample_rate: u32) -> Result<AudioBuffer> {
    let bytes = decode_bytes(data)?;

    let mut samples = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks_exact(2) {
        let value = i16::from_le_bytes([pair[0], pair[1]]);
        samples.push(value as f32 / 32768.0);
    }

    Ok(AudioBuffer {
        samples,
        sample_rate,
    })
}

/// Base64-encode raw bytes (standard alphabet, padded)
pub fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Base64-decode into raw bytes
pub fn decode_bytes(data: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .context("Failed to decode base64 payload")
}
