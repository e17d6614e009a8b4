use tracing::{info, warn};

use super::{CredentialState, SoundboardController};
use crate::gemini::ApiKeyStoreError;

impl SoundboardController {
    /// Ask the credential source whether a key is available right now.
    pub fn check_credentials(&mut self) -> bool {
        let available = self
            .services
            .credentials
            .api_key()
            .is_some_and(|key| !key.trim().is_empty());
        self.credentials = if available {
            CredentialState::Available
        } else {
            CredentialState::Missing
        };
        available
    }

    /// Store a user-entered key, then read it back before leaving the gate.
    pub fn submit_api_key(&mut self, key: &str) -> Result<bool, ApiKeyStoreError> {
        self.services.credentials.store_api_key(key)?;
        let available = self.check_credentials();
        if available {
            info!("API key accepted");
            self.status = None;
        } else {
            warn!("API key still unavailable after saving");
        }
        Ok(available)
    }

    pub(super) fn mark_credentials_missing(&mut self) {
        if self.credentials != CredentialState::Missing {
            warn!("API key missing or rejected; waiting for a new one");
        }
        self.credentials = CredentialState::Missing;
        self.set_status("API key missing or rejected");
    }
}
