//! Generative AI collaborators: speech synthesis, deck generation and the
//! API key they both need.
//!
//! The controller only sees the traits below, so tests can swap in fakes.

mod api;
mod key_store;

pub use api::{GeminiClient, GeminiError, deck_instruction};
pub use key_store::{API_KEY_ENV, ApiKeyStore, ApiKeyStoreError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::soundboard::SoundboardItem;

/// Failure reported by a collaborator call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// No usable API key; the app must return to the gating screen.
    #[error("API key missing or rejected")]
    CredentialMissing,
    /// Any other failure; recovered locally by the caller.
    #[error("{0}")]
    Failed(String),
}

/// Turns a prompt into encoded speech audio.
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns the base64 payload, or `None` when the service produced no audio.
    fn synthesize(&self, prompt: &str) -> Result<Option<String>, CollaboratorError>;
}

/// Produces a fresh set of soundboard items.
pub trait DeckGenerator: Send + Sync {
    fn generate_deck(&self, count: usize) -> Result<Vec<SoundboardItem>, CollaboratorError>;
}

/// Where the API key comes from and where a user-entered key goes.
pub trait CredentialSource: Send + Sync {
    fn api_key(&self) -> Option<String>;
    fn store_api_key(&self, key: &str) -> Result<(), ApiKeyStoreError>;
}

/// `[gemini]` table of the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeminiSettings {
    pub base_url: String,
    pub speech_model: String,
    pub deck_model: String,
    /// Prebuilt voice used for every sound.
    pub voice: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            speech_model: "gemini-2.5-flash-preview-tts".to_string(),
            deck_model: "gemini-3-flash-preview".to_string(),
            voice: "Puck".to_string(),
        }
    }
}

impl GeminiSettings {
    /// Fill blank fields with defaults and drop a trailing slash from the base URL.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let pick = |value: String, fallback: String| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                fallback
            } else {
                trimmed.to_string()
            }
        };
        Self {
            base_url: pick(self.base_url, defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            speech_model: pick(self.speech_model, defaults.speech_model),
            deck_model: pick(self.deck_model, defaults.deck_model),
            voice: pick(self.voice, defaults.voice),
        }
    }
}
