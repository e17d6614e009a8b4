use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use super::jobs::{JobMessage, SynthesisPurpose, SynthesisResult};
use super::{PlayRequest, SoundboardController};
use crate::audio::{FinishReason, FinishedVoice, decode_speech};
use crate::gemini::CollaboratorError;
use crate::soundboard::{EncodedAudio, SoundboardItem, format_clock};

impl SoundboardController {
    /// Play `id`, from the cache when possible, otherwise after synthesis.
    pub fn play(&mut self, id: &str) -> PlayRequest {
        if self.needs_credentials() {
            return PlayRequest::Gated;
        }
        let Some(item) = self.deck.get(id).cloned() else {
            return PlayRequest::UnknownItem;
        };
        if let Err(err) = self.engine.ensure_output() {
            warn!("Audio output unavailable: {err}");
            self.set_status(format!("Audio output unavailable: {err}"));
            return PlayRequest::Failed;
        }
        if let Some(payload) = self.cache.get(&item.id) {
            return self.start_playback(&item, &payload);
        }
        if self.loading_id.is_some() {
            debug!("Ignoring \"{}\" while another sound is loading", item.id);
            return PlayRequest::Busy;
        }
        self.loading_id = Some(item.id.clone());
        if let Err(err) = self.spawn_synthesis(item, SynthesisPurpose::Play) {
            warn!("Could not start synthesis worker: {err}");
            self.loading_id = None;
            return PlayRequest::Failed;
        }
        PlayRequest::Fetching
    }

    /// Play a uniformly chosen item of the current deck.
    pub fn play_random(&mut self) -> PlayRequest {
        match self.pick_random_item() {
            Some(item) => self.play(&item.id),
            None => PlayRequest::UnknownItem,
        }
    }

    pub(crate) fn pick_random_item(&mut self) -> Option<SoundboardItem> {
        self.deck.items().choose(&mut self.rng).cloned()
    }

    /// Silence everything: stop every voice, clear active and loading state
    /// and switch roulette off.
    pub fn stop_all(&mut self) {
        self.roulette_active = false;
        self.loading_id = None;
        let stopped = self.engine.stop_all();
        self.handle_finished(stopped);
        self.active_id = None;
    }

    /// Glide the master volume toward `level`; later sounds use it too.
    pub fn set_volume(&mut self, level: f32) {
        self.engine.set_volume(level);
    }

    pub(super) fn spawn_synthesis(
        &mut self,
        item: SoundboardItem,
        purpose: SynthesisPurpose,
    ) -> std::io::Result<()> {
        let synthesizer = self.services.synthesizer.clone();
        let epoch = self.deck_epoch;
        self.jobs.spawn("memeroulette-synthesis", move || {
            let result = synthesizer.synthesize(&item.prompt);
            JobMessage::Synthesized(SynthesisResult {
                item,
                purpose,
                epoch,
                result,
            })
        })
    }

    pub(super) fn apply_play_synthesis(&mut self, message: SynthesisResult) {
        let SynthesisResult {
            item,
            epoch,
            result,
            ..
        } = message;
        if self.loading_id.as_deref() == Some(item.id.as_str()) {
            self.loading_id = None;
        }
        match result {
            Ok(Some(payload)) => {
                let payload: EncodedAudio = payload.into();
                // Only audio that actually played is worth keeping.
                if self.start_playback(&item, &payload) != PlayRequest::Started {
                    return;
                }
                if epoch == self.deck_epoch {
                    self.cache.set(&item.id, payload);
                } else {
                    debug!("Not caching \"{}\" from a replaced deck", item.id);
                }
            }
            Ok(None) => {
                warn!("Synthesis returned no audio for \"{}\"", item.id);
                self.set_status(format!("No audio for {}", item.label));
            }
            Err(CollaboratorError::CredentialMissing) => self.mark_credentials_missing(),
            Err(CollaboratorError::Failed(err)) => {
                warn!("Synthesis failed for \"{}\": {err}", item.id);
                self.set_status(format!("Could not generate {}: {err}", item.label));
            }
        }
    }

    /// Decode and start `payload`; history only records sounds that started.
    fn start_playback(&mut self, item: &SoundboardItem, payload: &str) -> PlayRequest {
        let buffer = match decode_speech(payload) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!("Could not decode audio for \"{}\": {err}", item.id);
                self.set_status(format!("Broken audio for {}", item.label));
                self.clear_active(&item.id);
                return PlayRequest::Failed;
            }
        };
        match self.engine.start(&buffer, &item.id) {
            Ok(_) => {
                info!("Playing \"{}\"", item.label);
                self.active_id = Some(item.id.clone());
                self.history
                    .push(&item.label, format_clock(crate::logging::now_local_or_utc()));
                PlayRequest::Started
            }
            Err(err) => {
                warn!("Could not start \"{}\": {err}", item.id);
                self.set_status(format!("Audio output unavailable: {err}"));
                self.clear_active(&item.id);
                PlayRequest::Failed
            }
        }
    }

    /// Apply completion records, whether the voice ended or was stopped.
    pub(super) fn handle_finished(&mut self, finished: Vec<FinishedVoice>) {
        for voice in finished {
            if voice.reason == FinishReason::Ended {
                debug!("Voice {} for \"{}\" ended", voice.id, voice.tag);
            }
            self.clear_active(&voice.tag);
        }
    }

    fn clear_active(&mut self, id: &str) {
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
    }
}
