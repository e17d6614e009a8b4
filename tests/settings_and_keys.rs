mod support;

use std::sync::Arc;

use memeroulette::config::{self, AppSettings};
use memeroulette::gemini::{ApiKeyStore, CredentialSource};
use support::env::MemeEnvGuard;
use support::fakes::Board;
use tempfile::TempDir;

fn isolated() -> (TempDir, MemeEnvGuard) {
    let temp = tempfile::tempdir().expect("create tempdir");
    let guard = MemeEnvGuard::isolated(temp.path().join("config"));
    (temp, guard)
}

#[test]
fn settings_survive_a_restart() {
    let (temp, _env) = isolated();
    assert_eq!(config::load_or_default().unwrap(), AppSettings::default());

    let settings = AppSettings {
        volume: 0.35,
        roulette_interval_secs: 5,
        ..AppSettings::default()
    };
    config::save(&settings).unwrap();

    let path = config::config_path().unwrap();
    assert!(path.starts_with(temp.path()));
    assert!(path.is_file());
    assert_eq!(config::load_or_default().unwrap(), settings);
}

#[test]
fn out_of_range_values_are_normalized_on_load() {
    let (_temp, _env) = isolated();
    let path = config::config_path().unwrap();
    std::fs::write(&path, "volume = 4.0\nroulette_interval_secs = 0\n").unwrap();

    let loaded = config::load_or_default().unwrap();

    assert_eq!(loaded.volume, 1.0);
    assert_eq!(loaded.roulette_interval_secs, 1);
    assert_eq!(loaded.deck_refresh_interval_secs, 180);
}

#[test]
fn entered_key_is_stored_and_lifts_the_gate() {
    let (_temp, _env) = isolated();
    let store = Arc::new(ApiKeyStore::new().unwrap());
    assert_eq!(store.api_key(), None);

    let mut board = Board::new(store.clone());
    assert!(board.controller.needs_credentials());
    assert!(board.controller.submit_api_key("  secret-key  ").unwrap());
    assert!(!board.controller.needs_credentials());

    let reopened = ApiKeyStore::new().unwrap();
    assert_eq!(reopened.api_key().as_deref(), Some("secret-key"));
}
