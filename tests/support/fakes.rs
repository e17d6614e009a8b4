use std::sync::{Arc, Mutex};

use memeroulette::audio::{PlaybackEngine, encode_speech};
use memeroulette::config::AppSettings;
use memeroulette::controller::{ControllerServices, JobExecution, SoundboardController};
use memeroulette::gemini::{
    ApiKeyStoreError, CollaboratorError, CredentialSource, DeckGenerator, SpeechSynthesizer,
};
use memeroulette::soundboard::SoundboardItem;

/// A fifth of a second of 24 kHz speech.
pub fn clip() -> String {
    encode_speech(&[6_000; 4_800])
}

/// Synthesizer that answers every prompt with [`clip`] and records the prompts.
#[derive(Default)]
pub struct EchoSpeech {
    prompts: Mutex<Vec<String>>,
}

impl EchoSpeech {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for EchoSpeech {
    fn synthesize(&self, prompt: &str) -> Result<Option<String>, CollaboratorError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(Some(clip()))
    }
}

/// Deck generator that returns one scripted deck per call.
#[derive(Default)]
pub struct ScriptedDecks {
    decks: Mutex<Vec<Vec<SoundboardItem>>>,
}

impl ScriptedDecks {
    pub fn push(&self, items: Vec<SoundboardItem>) {
        self.decks.lock().unwrap().push(items);
    }
}

impl DeckGenerator for ScriptedDecks {
    fn generate_deck(&self, _count: usize) -> Result<Vec<SoundboardItem>, CollaboratorError> {
        let mut decks = self.decks.lock().unwrap();
        if decks.is_empty() {
            return Err(CollaboratorError::Failed("generator offline".into()));
        }
        Ok(decks.remove(0))
    }
}

pub fn themed_deck(theme: &str, count: usize) -> Vec<SoundboardItem> {
    (0..count)
        .map(|n| {
            SoundboardItem::new(
                &format!("{theme}-{n}"),
                &format!("{theme} {n}"),
                &format!("Say \"{theme} number {n}\" dramatically."),
                "🔊",
                "bg-lime-600",
            )
        })
        .collect()
}

pub struct Board {
    pub controller: SoundboardController,
    pub speech: Arc<EchoSpeech>,
    pub decks: Arc<ScriptedDecks>,
}

impl Board {
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self::with_settings(AppSettings::default(), credentials)
    }

    pub fn with_settings(settings: AppSettings, credentials: Arc<dyn CredentialSource>) -> Self {
        let speech = Arc::new(EchoSpeech::default());
        let decks = Arc::new(ScriptedDecks::default());
        let services = ControllerServices {
            synthesizer: speech.clone(),
            deck_generator: decks.clone(),
            credentials,
        };
        let engine = PlaybackEngine::detached(settings.volume);
        let mut controller =
            SoundboardController::with_engine(&settings, services, engine, JobExecution::Queued);
        controller.seed_rng(11);
        Self {
            controller,
            speech,
            decks,
        }
    }

    /// Run queued jobs and apply their results until none are left.
    pub fn settle(&mut self) {
        loop {
            let ran = self.controller.run_queued_jobs();
            self.controller.poll_background_jobs();
            if ran == 0 {
                break;
            }
        }
    }

    /// Render `seconds` of mixed output and apply ended voices.
    pub fn render(&mut self, seconds: f32) {
        let format = self.controller.engine().mix_format();
        let frames = (seconds * format.sample_rate as f32) as usize;
        let mut out = vec![0.0; frames * format.channels as usize];
        self.controller.engine_mut().render(&mut out);
        self.controller.poll_background_jobs();
    }

    pub fn history_labels(&self) -> Vec<String> {
        self.controller
            .history()
            .map(|entry| entry.label.clone())
            .collect()
    }
}

/// In-memory credential source.
pub struct MemoryKeys {
    key: Mutex<Option<String>>,
}

impl MemoryKeys {
    pub fn with(key: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            key: Mutex::new(key.map(str::to_string)),
        })
    }
}

impl CredentialSource for MemoryKeys {
    fn api_key(&self) -> Option<String> {
        self.key.lock().unwrap().clone()
    }

    fn store_api_key(&self, key: &str) -> Result<(), ApiKeyStoreError> {
        *self.key.lock().unwrap() = Some(key.to_string());
        Ok(())
    }
}
