use std::path::{Path, PathBuf};

use tracing::warn;

use super::CredentialSource;
use crate::app_dirs;

const KEYRING_SERVICE: &str = "memeroulette";
const KEYRING_KEY: &str = "memeroulette_gemini_api_key";
const DISABLE_KEYRING_ENV: &str = "MEMEROULETTE_DISABLE_KEYRING";

/// Environment variable consulted before the store.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ApiKeyStoreError {
    #[error("Key store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Crypto error: {0}")]
    Crypto(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("App dir error: {0}")]
    AppDir(#[from] crate::app_dirs::AppDirError),
}

/// Gemini API key storage: OS keyring first, encrypted file as fallback.
#[derive(Clone, Debug)]
pub struct ApiKeyStore {
    fallback_dir: PathBuf,
    use_keyring: bool,
    env_var: Option<&'static str>,
}

impl ApiKeyStore {
    pub fn new() -> Result<Self, ApiKeyStoreError> {
        Ok(Self {
            fallback_dir: app_dirs::secrets_dir()?,
            use_keyring: !keyring_disabled(),
            env_var: Some(API_KEY_ENV),
        })
    }

    /// Store that only uses the encrypted file in `dir` and ignores the environment.
    pub fn file_only(dir: &Path) -> Result<Self, ApiKeyStoreError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            fallback_dir: dir.to_path_buf(),
            use_keyring: false,
            env_var: None,
        })
    }

    pub fn get(&self) -> Result<Option<String>, ApiKeyStoreError> {
        if let Some(key) = self.try_keyring_get()? {
            return Ok(Some(key));
        }
        self.fallback_get()
    }

    pub fn set(&self, key: &str) -> Result<(), ApiKeyStoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(());
        }
        if self.try_keyring_set(key).is_ok() {
            let _ = self.fallback_delete();
            return Ok(());
        }
        self.fallback_set(key)
    }

    pub fn delete(&self) -> Result<(), ApiKeyStoreError> {
        let _ = self.try_keyring_delete();
        let _ = self.fallback_delete();
        Ok(())
    }

    fn keyring_entry(&self) -> Result<keyring::Entry, ApiKeyStoreError> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_KEY)
            .map_err(|err| ApiKeyStoreError::Unavailable(err.to_string()))
    }

    fn try_keyring_get(&self) -> Result<Option<String>, ApiKeyStoreError> {
        if !self.use_keyring {
            return Ok(None);
        }
        match self.keyring_entry()?.get_password() {
            Ok(key) => Ok(Some(key)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(_) => Ok(None),
        }
    }

    fn try_keyring_set(&self, key: &str) -> Result<(), ApiKeyStoreError> {
        if !self.use_keyring {
            return Err(ApiKeyStoreError::Unavailable("keyring disabled".into()));
        }
        self.keyring_entry()?
            .set_password(key)
            .map_err(|err| ApiKeyStoreError::Unavailable(err.to_string()))
    }

    fn try_keyring_delete(&self) -> Result<(), ApiKeyStoreError> {
        if !self.use_keyring {
            return Ok(());
        }
        let _ = self.keyring_entry()?.delete_credential();
        Ok(())
    }

    fn fallback_key_path(&self) -> PathBuf {
        self.fallback_dir.join("gemini_api_key.bin")
    }

    fn fallback_cipher_path(&self) -> PathBuf {
        self.fallback_dir.join("gemini_api_key.key")
    }

    fn fallback_get(&self) -> Result<Option<String>, ApiKeyStoreError> {
        let data_path = self.fallback_key_path();
        if !data_path.exists() {
            return Ok(None);
        }
        let data = std::fs::read(data_path)?;
        if data.len() < 12 {
            return Err(ApiKeyStoreError::Decode("key file too short".into()));
        }
        let (nonce, ciphertext) = data.split_at(12);
        let cipher_key = std::fs::read(self.fallback_cipher_path())?;
        if cipher_key.len() != 32 {
            return Err(ApiKeyStoreError::Decode("cipher key invalid".into()));
        }
        let plaintext = decrypt(&cipher_key, nonce, ciphertext)?;
        let key =
            String::from_utf8(plaintext).map_err(|err| ApiKeyStoreError::Decode(err.to_string()))?;
        Ok(Some(key))
    }

    fn fallback_set(&self, key: &str) -> Result<(), ApiKeyStoreError> {
        let cipher_path = self.fallback_cipher_path();
        let cipher_key = if cipher_path.exists() {
            std::fs::read(&cipher_path)?
        } else {
            let bytes = random_bytes(32)?;
            write_private_file(&cipher_path, &bytes)?;
            bytes
        };
        if cipher_key.len() != 32 {
            return Err(ApiKeyStoreError::Decode("cipher key invalid".into()));
        }
        let nonce = random_bytes(12)?;
        let ciphertext = encrypt(&cipher_key, &nonce, key.as_bytes())?;
        let mut payload = Vec::with_capacity(nonce.len() + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);
        write_private_file(&self.fallback_key_path(), &payload)?;
        Ok(())
    }

    fn fallback_delete(&self) -> Result<(), ApiKeyStoreError> {
        let _ = std::fs::remove_file(self.fallback_key_path());
        let _ = std::fs::remove_file(self.fallback_cipher_path());
        Ok(())
    }
}

impl CredentialSource for ApiKeyStore {
    fn api_key(&self) -> Option<String> {
        if let Some(name) = self.env_var {
            if let Ok(key) = std::env::var(name) {
                if !key.trim().is_empty() {
                    return Some(key.trim().to_string());
                }
            }
        }
        match self.get() {
            Ok(key) => key.filter(|key| !key.trim().is_empty()),
            Err(err) => {
                warn!("Could not read stored API key: {err}");
                None
            }
        }
    }

    fn store_api_key(&self, key: &str) -> Result<(), ApiKeyStoreError> {
        self.set(key)
    }
}

fn keyring_disabled() -> bool {
    std::env::var(DISABLE_KEYRING_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn random_bytes(len: usize) -> Result<Vec<u8>, ApiKeyStoreError> {
    let mut out = vec![0u8; len];
    use rand::TryRngCore;
    rand::rngs::OsRng
        .try_fill_bytes(&mut out)
        .map_err(|err| ApiKeyStoreError::Unavailable(err.to_string()))?;
    Ok(out)
}

fn write_private_file(path: &Path, bytes: &[u8]) -> Result<(), ApiKeyStoreError> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    file.write_all(bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

fn encrypt(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, ApiKeyStoreError> {
    use chacha20poly1305::aead::{Aead, KeyInit};
    let cipher = chacha20poly1305::ChaCha20Poly1305::new_from_slice(key)
        .map_err(|err| ApiKeyStoreError::Crypto(err.to_string()))?;
    let nonce = chacha20poly1305::Nonce::from_slice(nonce);
    cipher
        .encrypt(nonce, plaintext)
        .map_err(|err| ApiKeyStoreError::Crypto(err.to_string()))
}

fn decrypt(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, ApiKeyStoreError> {
    use chacha20poly1305::aead::{Aead, KeyInit};
    let cipher = chacha20poly1305::ChaCha20Poly1305::new_from_slice(key)
        .map_err(|err| ApiKeyStoreError::Crypto(err.to_string()))?;
    let nonce = chacha20poly1305::Nonce::from_slice(nonce);
    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|err| ApiKeyStoreError::Crypto(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_fallback_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ApiKeyStore::file_only(dir.path()).unwrap();
        assert_eq!(store.get().unwrap(), None);
        assert_eq!(store.api_key(), None);
        store.store_api_key("  AIzaSyExampleKey0123456789  ").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("AIzaSyExampleKey0123456789"));
        assert_eq!(store.api_key().as_deref(), Some("AIzaSyExampleKey0123456789"));
        store.delete().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn stored_key_is_not_plaintext() {
        let dir = tempdir().unwrap();
        let store = ApiKeyStore::file_only(dir.path()).unwrap();
        store.set("AIzaSyPlaintextCheck").unwrap();
        let raw = std::fs::read(dir.path().join("gemini_api_key.bin")).unwrap();
        assert!(!String::from_utf8_lossy(&raw).contains("AIzaSyPlaintextCheck"));
    }

    #[test]
    fn blank_key_is_ignored() {
        let dir = tempdir().unwrap();
        let store = ApiKeyStore::file_only(dir.path()).unwrap();
        store.set("   ").unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn corrupt_key_file_reports_decode_error() {
        let dir = tempdir().unwrap();
        let store = ApiKeyStore::file_only(dir.path()).unwrap();
        std::fs::write(dir.path().join("gemini_api_key.bin"), b"short").unwrap();
        assert!(matches!(store.get(), Err(ApiKeyStoreError::Decode(_))));
        assert_eq!(store.api_key(), None);
    }
}
