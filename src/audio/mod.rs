//! Speech decoding and playback: a lazily opened output stream fed by one
//! mixer with a shared ramped gain.

pub mod decode;
pub mod engine;
pub mod output;

mod gain;
mod mixer;
mod voice;

pub use decode::{
    DecodeError, PcmBuffer, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE, decode, decode_audio_data,
    decode_speech, encode_speech,
};
pub use engine::PlaybackEngine;
pub use mixer::{FinishReason, FinishedVoice, MIX_FORMAT, MixFormat};
pub use output::{AudioOutputConfig, AudioOutputError, ResolvedOutput};
pub use voice::VoiceId;

pub(crate) use gain::VOLUME_TIME_CONSTANT;

#[cfg(test)]
mod tests;
