//! Speech payload decoding: base64 text to raw PCM bytes to f32 samples.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Sample rate of the synthesized speech.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
/// Channel count of the synthesized speech.
pub const SPEECH_CHANNELS: u16 = 1;

/// Errors raised while turning a payload into playable samples.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload or the decoded PCM data is empty.
    #[error("Audio payload is empty")]
    Empty,
    /// The payload is not valid base64.
    #[error("Audio payload is not valid base64: {0}")]
    Base64(String),
    /// The PCM data does not split into whole 16-bit frames.
    #[error("PCM data of {len} bytes does not divide into {channels}-channel 16-bit frames")]
    Misaligned { len: usize, channels: u16 },
    /// The declared format cannot describe any audio.
    #[error("Unsupported PCM format: {sample_rate} Hz, {channels} channels")]
    Format { sample_rate: u32, channels: u16 },
}

/// Decoded samples ready to hand to the mixer.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    /// Interleaved samples in -1.0..1.0.
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Decode a base64 payload into raw bytes.
///
/// ASCII whitespace (line wrapping) is ignored; any other invalid character
/// is an error rather than silently skipped.
pub fn decode(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = payload
        .chars()
        .filter(|ch| !ch.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(DecodeError::Empty);
    }
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| DecodeError::Base64(err.to_string()))
}

/// Interpret raw bytes as interleaved signed 16-bit little-endian PCM.
pub fn decode_audio_data(
    raw: &[u8],
    sample_rate: u32,
    channels: u16,
) -> Result<PcmBuffer, DecodeError> {
    if sample_rate == 0 || channels == 0 {
        return Err(DecodeError::Format {
            sample_rate,
            channels,
        });
    }
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }
    let frame_bytes = 2 * channels as usize;
    if raw.len() % frame_bytes != 0 {
        return Err(DecodeError::Misaligned {
            len: raw.len(),
            channels,
        });
    }
    let samples: Arc<[f32]> = raw
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32_768.0)
        .collect();
    Ok(PcmBuffer {
        samples,
        sample_rate,
        channels,
    })
}

/// Full pipeline for a synthesized speech payload.
pub fn decode_speech(payload: &str) -> Result<PcmBuffer, DecodeError> {
    let raw = decode(payload)?;
    decode_audio_data(&raw, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)
}

/// Encode PCM samples the way the speech service does; used by tests and fakes.
pub fn encode_speech(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples
        .iter()
        .flat_map(|sample| sample.to_le_bytes())
        .collect();
    STANDARD.encode(bytes)
}
