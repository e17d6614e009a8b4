use std::{
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

const CONFIG_HOME_ENV: &str = "MEMEROULETTE_CONFIG_HOME";
const DISABLE_KEYRING_ENV: &str = "MEMEROULETTE_DISABLE_KEYRING";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Points the app root at a temp dir, forces the file key store and hides any
/// real API key for the lifetime of the guard.
pub struct MemeEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl MemeEnvGuard {
    pub fn isolated(config_home: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = [CONFIG_HOME_ENV, DISABLE_KEYRING_ENV, API_KEY_ENV]
            .into_iter()
            .map(|name| (name, std::env::var(name).ok()))
            .collect();
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var(CONFIG_HOME_ENV, config_home);
            std::env::set_var(DISABLE_KEYRING_ENV, "1");
            std::env::remove_var(API_KEY_ENV);
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for MemeEnvGuard {
    fn drop(&mut self) {
        for (name, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}
