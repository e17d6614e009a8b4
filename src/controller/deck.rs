use tracing::{debug, info, warn};

use super::SoundboardController;
use super::jobs::{DeckResult, JobMessage, SynthesisPurpose, SynthesisResult};
use crate::audio::decode_speech;
use crate::gemini::CollaboratorError;
use crate::soundboard::{Deck, EncodedAudio, SoundboardItem};

impl SoundboardController {
    /// Ask for a new deck. Returns false when a refresh is already running or
    /// could not be started.
    pub fn refresh_deck(&mut self) -> bool {
        if self.refreshing || self.needs_credentials() {
            return false;
        }
        self.refreshing = true;
        let generator = self.services.deck_generator.clone();
        let count = self.deck_size;
        let spawned = self.jobs.spawn("memeroulette-deck", move || {
            JobMessage::DeckGenerated(DeckResult {
                result: generator.generate_deck(count),
            })
        });
        if let Err(err) = spawned {
            warn!("Could not start deck generation: {err}");
            self.refreshing = false;
            self.deck_timer.reset();
            return false;
        }
        info!("Deck evolution requested ({count} items)");
        true
    }

    pub(super) fn apply_deck_result(&mut self, message: DeckResult) {
        self.refreshing = false;
        self.deck_timer.reset();
        match message.result {
            Ok(items) => {
                let deck = Deck::from_items(items);
                if deck.is_empty() {
                    warn!("Deck generator returned no usable items; keeping current deck");
                    self.set_status("Evolution produced nothing; keeping current deck");
                    return;
                }
                self.replace_deck(deck);
            }
            Err(CollaboratorError::CredentialMissing) => self.mark_credentials_missing(),
            Err(CollaboratorError::Failed(err)) => {
                warn!("Deck evolution failed: {err}");
                self.set_status(format!("Evolution failed: {err}"));
            }
        }
    }

    fn replace_deck(&mut self, deck: Deck) {
        info!("Deck evolved: {} items", deck.len());
        let upcoming: Vec<SoundboardItem> = deck
            .items()
            .iter()
            .take(self.prefetch_count)
            .cloned()
            .collect();
        self.deck = deck;
        self.cache.clear();
        self.deck_epoch += 1;
        self.prefetch.pending = upcoming.into();
        self.dispatch_next_prefetch();
    }

    /// Start the next prefetch unless one is running. Items cached in the
    /// meantime are skipped.
    pub(super) fn dispatch_next_prefetch(&mut self) {
        if self.prefetch.in_flight.is_some() {
            return;
        }
        while let Some(item) = self.prefetch.pending.pop_front() {
            if self.cache.has(&item.id) {
                debug!("Prefetch skips cached \"{}\"", item.id);
                continue;
            }
            let id = item.id.clone();
            match self.spawn_synthesis(item, SynthesisPurpose::Prefetch) {
                Ok(()) => {
                    self.prefetch.in_flight = Some(id);
                    return;
                }
                Err(err) => warn!("Could not start prefetch for \"{id}\": {err}"),
            }
        }
    }

    pub(super) fn apply_prefetch_synthesis(&mut self, message: SynthesisResult) {
        self.prefetch.in_flight = None;
        if message.epoch != self.deck_epoch {
            debug!("Dropping prefetch for \"{}\" from a replaced deck", message.item.id);
        } else {
            match message.result {
                Ok(Some(payload)) => match decode_speech(&payload) {
                    Ok(_) => {
                        let payload: EncodedAudio = payload.into();
                        self.cache.set(&message.item.id, payload);
                        debug!("Prefetched \"{}\"", message.item.id);
                    }
                    Err(err) => warn!("Prefetched audio for \"{}\" is unusable: {err}", message.item.id),
                },
                Ok(None) => warn!("Prefetch returned no audio for \"{}\"", message.item.id),
                Err(CollaboratorError::CredentialMissing) => {
                    self.prefetch.pending.clear();
                    self.mark_credentials_missing();
                }
                Err(CollaboratorError::Failed(err)) => {
                    warn!("Prefetch failed for \"{}\": {err}", message.item.id)
                }
            }
        }
        self.dispatch_next_prefetch();
    }
}
