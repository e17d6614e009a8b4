use super::*;
use crate::app_dirs::{APP_DIR_NAME, ConfigBaseGuard, TEST_DIR_LOCK};
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let settings = load_settings_from(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.volume, 0.8);
    assert_eq!(settings.roulette_interval_secs, 10);
    assert_eq!(settings.deck_refresh_interval_secs, 180);
    assert_eq!(settings.prefetch_count, 4);
    assert_eq!(settings.deck_size, 12);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "volume = 0.5\n\n[gemini]\nvoice = \"Kore\"\n\n[audio_output]\ndevice = \"Speakers\"\n",
    )
    .unwrap();
    let settings = load_settings_from(&path).unwrap();
    assert_eq!(settings.volume, 0.5);
    assert_eq!(settings.roulette_interval_secs, 10);
    assert_eq!(settings.gemini.voice, "Kore");
    assert_eq!(settings.gemini.speech_model, "gemini-2.5-flash-preview-tts");
    assert_eq!(settings.audio_output.device.as_deref(), Some("Speakers"));
}

#[test]
fn out_of_range_values_are_normalized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "volume = 3.0\nroulette_interval_secs = 0\ndeck_size = 3\nprefetch_count = 9\n",
    )
    .unwrap();
    let settings = load_settings_from(&path).unwrap();
    assert_eq!(settings.volume, 1.0);
    assert_eq!(settings.roulette_interval_secs, 1);
    assert_eq!(settings.deck_size, 3);
    assert_eq!(settings.prefetch_count, 3);
}

#[test]
fn invalid_toml_is_reported_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "volume = [").unwrap();
    let err = load_settings_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { .. }));
    assert!(err.to_string().contains(CONFIG_FILE_NAME));
}

#[test]
fn save_round_trips_and_leaves_no_temp_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
    let settings = AppSettings {
        volume: 0.25,
        deck_refresh_interval_secs: 60,
        ..AppSettings::default()
    };
    save_to_path(&settings, &path).unwrap();
    assert_eq!(load_settings_from(&path).unwrap(), settings);
    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn config_path_lives_in_app_root() {
    let _lock = TEST_DIR_LOCK.lock().unwrap_or_else(|err| err.into_inner());
    let base = tempdir().unwrap();
    let _guard = ConfigBaseGuard::set(base.path().to_path_buf());
    assert_eq!(
        config_path().unwrap(),
        base.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
    );
    let mut settings = load_or_default().unwrap();
    settings.volume = 0.4;
    save(&settings).unwrap();
    assert_eq!(load_or_default().unwrap().volume, 0.4);
}
