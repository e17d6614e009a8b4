use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Source;

use super::decode::PcmBuffer;
use super::gain::GainRamp;
use super::voice::{Voice, VoiceId};

/// Sample format produced by the mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Internal mix format; the output stream converts it to the device format.
pub const MIX_FORMAT: MixFormat = MixFormat {
    sample_rate: 48_000,
    channels: 2,
};

/// Why a voice left the mixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Played to the end of its buffer.
    Ended,
    /// Removed by stop-all.
    Stopped,
}

/// Completion record for a voice, delivered for natural ends and stops alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedVoice {
    pub id: VoiceId,
    pub tag: String,
    pub reason: FinishReason,
}

/// State shared between the engine and the audio thread.
pub(crate) struct MixerState {
    format: MixFormat,
    voices: Vec<Voice>,
    finished: Vec<FinishedVoice>,
    gain: GainRamp,
    next_id: VoiceId,
}

impl MixerState {
    pub(crate) fn new(format: MixFormat, volume: f32) -> Self {
        Self {
            format,
            voices: Vec::new(),
            finished: Vec::new(),
            gain: GainRamp::new(volume, format.sample_rate),
            next_id: 1,
        }
    }

    pub(crate) fn format(&self) -> MixFormat {
        self.format
    }

    pub(crate) fn add_voice(&mut self, buffer: &PcmBuffer, tag: &str) -> VoiceId {
        let id = self.next_id;
        self.next_id += 1;
        self.voices.push(Voice::new(id, tag, buffer, self.format));
        id
    }

    /// Remove every voice, reporting each one as stopped.
    pub(crate) fn stop_all(&mut self) -> Vec<FinishedVoice> {
        self.voices
            .drain(..)
            .map(|voice| FinishedVoice {
                id: voice.id,
                tag: voice.tag,
                reason: FinishReason::Stopped,
            })
            .collect()
    }

    /// Voices that reached their end since the last call.
    pub(crate) fn take_finished(&mut self) -> Vec<FinishedVoice> {
        std::mem::take(&mut self.finished)
    }

    pub(crate) fn set_volume(&mut self, level: f32) {
        self.gain.set_target(level);
    }

    pub(crate) fn current_gain(&self) -> f32 {
        self.gain.current()
    }

    pub(crate) fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Mix all voices into `out` (interleaved, mixer format) and apply the
    /// master gain frame by frame.
    pub(crate) fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let finished = &mut self.finished;
        self.voices.retain_mut(|voice| {
            for sample_out in out.iter_mut() {
                match voice.next_sample() {
                    Some(sample) => *sample_out += sample,
                    None => {
                        finished.push(FinishedVoice {
                            id: voice.id,
                            tag: std::mem::take(&mut voice.tag),
                            reason: FinishReason::Ended,
                        });
                        return false;
                    }
                }
            }
            true
        });
        let channels = self.format.channels.max(1) as usize;
        for frame in out.chunks_mut(channels) {
            let gain = self.gain.next_gain();
            for sample in frame {
                *sample *= gain;
            }
        }
    }
}

/// Frames rendered per lock of the shared state.
const BLOCK_FRAMES: usize = 256;

/// Endless rodio source that pulls blocks from the shared mixer.
pub(crate) struct MixerSource {
    state: Arc<Mutex<MixerState>>,
    format: MixFormat,
    block: Vec<f32>,
    position: usize,
}

impl MixerSource {
    pub(crate) fn new(state: Arc<Mutex<MixerState>>) -> Self {
        let format = lock_state(&state).format();
        let block_len = BLOCK_FRAMES * format.channels.max(1) as usize;
        Self {
            state,
            format,
            block: vec![0.0; block_len],
            position: block_len,
        }
    }
}

impl Iterator for MixerSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.block.len() {
            lock_state(&self.state).render(&mut self.block);
            self.position = 0;
        }
        let sample = self.block[self.position];
        self.position += 1;
        Some(sample)
    }
}

impl Source for MixerSource {
    #[inline]
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    #[inline]
    fn channels(&self) -> u16 {
        self.format.channels
    }

    #[inline]
    fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }

    #[inline]
    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

pub(crate) fn lock_state(state: &Mutex<MixerState>) -> std::sync::MutexGuard<'_, MixerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
