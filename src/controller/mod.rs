//! Application state for the soundboard and the operations the UI drives.
//!
//! Everything here runs on the UI thread. Collaborator calls run as jobs whose
//! results are applied in [`SoundboardController::poll_background_jobs`].

mod background;
mod credentials;
mod deck;
mod jobs;
mod playback;
mod schedule;

pub use jobs::JobExecution;

use std::collections::VecDeque;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::audio::PlaybackEngine;
use crate::config::AppSettings;
use crate::gemini::{CredentialSource, DeckGenerator, SpeechSynthesizer};
use crate::soundboard::{
    Countdown, Deck, HistoryEntry, HistoryLog, SecondClock, SoundCache, SoundboardItem,
    default_deck,
};

use jobs::ControllerJobs;

/// External services the controller calls into.
#[derive(Clone)]
pub struct ControllerServices {
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub deck_generator: Arc<dyn DeckGenerator>,
    pub credentials: Arc<dyn CredentialSource>,
}

/// Outcome of asking for an item to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayRequest {
    /// Cached audio started right away.
    Started,
    /// Synthesis was requested; playback starts when it completes.
    Fetching,
    /// Another item is loading and this one is not cached.
    Busy,
    /// No item with that id in the current deck.
    UnknownItem,
    /// No API key; playback is blocked until one is provided.
    Gated,
    /// The audio could not be decoded or the output could not start.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CredentialState {
    Available,
    Missing,
}

/// Items of a new deck still waiting to be synthesized ahead of time.
#[derive(Debug, Default)]
struct PrefetchQueue {
    pending: VecDeque<SoundboardItem>,
    /// Id of the request currently running.
    in_flight: Option<String>,
}

pub struct SoundboardController {
    deck: Deck,
    cache: SoundCache,
    engine: PlaybackEngine,
    history: HistoryLog,
    roulette: Countdown,
    deck_timer: Countdown,
    clock: Option<SecondClock>,
    roulette_active: bool,
    active_id: Option<String>,
    loading_id: Option<String>,
    refreshing: bool,
    credentials: CredentialState,
    /// Bumped on every deck swap so late prefetch results can be recognized.
    deck_epoch: u64,
    prefetch: PrefetchQueue,
    prefetch_count: usize,
    deck_size: usize,
    status: Option<String>,
    services: ControllerServices,
    jobs: ControllerJobs,
    rng: StdRng,
}

impl SoundboardController {
    /// Controller with a lazily opened audio device and background workers.
    pub fn new(settings: &AppSettings, services: ControllerServices) -> Self {
        let engine = PlaybackEngine::new(settings.audio_output.clone(), settings.volume);
        Self::with_engine(settings, services, engine, JobExecution::Background)
    }

    pub fn with_engine(
        settings: &AppSettings,
        services: ControllerServices,
        engine: PlaybackEngine,
        execution: JobExecution,
    ) -> Self {
        let mut controller = Self {
            deck: default_deck(),
            cache: SoundCache::new(),
            engine,
            history: HistoryLog::new(),
            roulette: Countdown::new(settings.roulette_interval_secs),
            deck_timer: Countdown::new(settings.deck_refresh_interval_secs),
            clock: None,
            roulette_active: false,
            active_id: None,
            loading_id: None,
            refreshing: false,
            credentials: CredentialState::Missing,
            deck_epoch: 0,
            prefetch: PrefetchQueue::default(),
            prefetch_count: settings.prefetch_count,
            deck_size: settings.deck_size.max(1),
            status: None,
            services,
            jobs: ControllerJobs::new(execution),
            rng: StdRng::from_rng(&mut rand::rng()),
        };
        controller.check_credentials();
        controller
    }

    /// Make roulette picks reproducible.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn items(&self) -> &[SoundboardItem] {
        self.deck.items()
    }

    pub fn item(&self, id: &str) -> Option<&SoundboardItem> {
        self.deck.get(id)
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.cache.has(id)
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn loading_id(&self) -> Option<&str> {
        self.loading_id.as_deref()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn roulette_active(&self) -> bool {
        self.roulette_active
    }

    pub fn roulette_seconds_left(&self) -> u32 {
        self.roulette.remaining()
    }

    pub fn deck_seconds_left(&self) -> u32 {
        self.deck_timer.remaining()
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.entries()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn flush_history(&mut self) {
        self.history.flush();
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    pub fn needs_credentials(&self) -> bool {
        self.credentials == CredentialState::Missing
    }

    /// Whether the button for `id` accepts presses.
    ///
    /// While one item loads, only items with cached audio stay enabled.
    pub fn is_item_enabled(&self, id: &str) -> bool {
        if self.needs_credentials() {
            return false;
        }
        self.loading_id.is_none() || self.cache.has(id)
    }

    /// Last recovered failure, for display.
    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.engine
    }

    /// Run jobs waiting under [`JobExecution::Queued`]; returns how many ran.
    pub fn run_queued_jobs(&mut self) -> usize {
        self.jobs.run_queued()
    }

    pub fn queued_job_count(&self) -> usize {
        self.jobs.queued_len()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}
