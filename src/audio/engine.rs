use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::decode::PcmBuffer;
use super::gain::clamp_level;
use super::mixer::{FinishedVoice, MIX_FORMAT, MixFormat, MixerState, lock_state};
use super::output::{AudioOutputConfig, AudioOutputError, OpenOutput, ResolvedOutput, open_output};
use super::voice::VoiceId;

enum OutputSlot {
    /// No device; the mixer is only rendered through [`PlaybackEngine::render`].
    Detached,
    /// Not opened yet (or the last attempt failed).
    Pending(AudioOutputConfig),
    Open(OpenOutput),
}

/// Plays decoded buffers through one shared, ramped master gain.
///
/// The output device is opened on first use. Voices that end on their own are
/// collected with [`reap_finished`](Self::reap_finished); [`stop_all`](Self::stop_all)
/// hands back the voices it removed in the same form.
pub struct PlaybackEngine {
    mixer: Arc<Mutex<MixerState>>,
    output: OutputSlot,
    volume: f32,
}

impl PlaybackEngine {
    /// Engine that opens the configured device lazily.
    pub fn new(config: AudioOutputConfig, volume: f32) -> Self {
        Self::with_slot(OutputSlot::Pending(config), volume)
    }

    /// Engine with no device attached, for headless use and tests.
    pub fn detached(volume: f32) -> Self {
        Self::with_slot(OutputSlot::Detached, volume)
    }

    fn with_slot(output: OutputSlot, volume: f32) -> Self {
        let volume = clamp_level(volume);
        Self {
            mixer: Arc::new(Mutex::new(MixerState::new(MIX_FORMAT, volume))),
            output,
            volume,
        }
    }

    /// Open the output device if that has not happened yet.
    ///
    /// A failed attempt leaves the engine pending so the next call retries.
    pub fn ensure_output(&mut self) -> Result<(), AudioOutputError> {
        let OutputSlot::Pending(config) = &self.output else {
            return Ok(());
        };
        let opened = open_output(config, self.mixer.clone())?;
        self.output = OutputSlot::Open(opened);
        Ok(())
    }

    /// Start playing `buffer`; `tag` comes back in the completion record.
    pub fn start(&mut self, buffer: &PcmBuffer, tag: &str) -> Result<VoiceId, AudioOutputError> {
        self.ensure_output()?;
        let id = lock_state(&self.mixer).add_voice(buffer, tag);
        debug!(
            "Voice {id} started for \"{tag}\" ({:.2}s)",
            buffer.duration().as_secs_f32()
        );
        Ok(id)
    }

    /// Stop every active voice and return them as stopped.
    pub fn stop_all(&mut self) -> Vec<FinishedVoice> {
        let stopped = lock_state(&self.mixer).stop_all();
        if !stopped.is_empty() {
            info!("Stopped {} active voice(s)", stopped.len());
        }
        stopped
    }

    /// Voices that played to the end since the last call.
    pub fn reap_finished(&mut self) -> Vec<FinishedVoice> {
        lock_state(&self.mixer).take_finished()
    }

    /// Glide the master gain toward `level` (clamped to 0.0..=1.0).
    pub fn set_volume(&mut self, level: f32) {
        self.volume = clamp_level(level);
        lock_state(&self.mixer).set_volume(self.volume);
    }

    /// Target volume, not the momentary ramp position.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Gain currently applied by the mixer.
    pub fn current_gain(&self) -> f32 {
        lock_state(&self.mixer).current_gain()
    }

    pub fn active_count(&self) -> usize {
        lock_state(&self.mixer).active_count()
    }

    pub fn is_output_open(&self) -> bool {
        matches!(self.output, OutputSlot::Open(_))
    }

    pub fn output_details(&self) -> Option<&ResolvedOutput> {
        match &self.output {
            OutputSlot::Open(open) => Some(&open.resolved),
            _ => None,
        }
    }

    pub fn mix_format(&self) -> MixFormat {
        lock_state(&self.mixer).format()
    }

    /// Pull interleaved samples straight from the mixer.
    ///
    /// Only meaningful for detached engines; with a device open this would
    /// steal samples from the audio thread.
    pub fn render(&mut self, out: &mut [f32]) {
        lock_state(&self.mixer).render(out);
    }
}
