//! Library exports for the binary and integration tests.
/// Per-user application directories.
pub mod app_dirs;
/// Speech decoding and playback.
pub mod audio;
/// Persisted user settings.
pub mod config;
/// Soundboard state and the operations the UI drives.
pub mod controller;
/// Gemini speech and deck generation client.
pub mod gemini;
mod http_client;
/// Tracing setup.
pub mod logging;
/// Items, cache, history and timers.
pub mod soundboard;
/// egui front end.
pub mod ui;
