//! Entry point for the Meme Roulette soundboard.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use std::sync::Arc;

use eframe::egui;
use memeroulette::config::{self, AppSettings};
use memeroulette::controller::{ControllerServices, SoundboardController};
use memeroulette::gemini::{ApiKeyStore, GeminiClient};
use memeroulette::logging;
use memeroulette::ui::{MIN_VIEWPORT_SIZE, SoundboardApp};
use tracing::warn;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let settings = config::load_or_default().unwrap_or_else(|err| {
        warn!("Failed to load config, using defaults: {err}");
        AppSettings::default()
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size(MIN_VIEWPORT_SIZE),
        ..Default::default()
    };

    eframe::run_native(
        "Meme Roulette",
        native_options,
        Box::new(move |_cc| match build_app(settings) {
            Ok(app) => Ok(Box::new(app)),
            Err(err) => Ok(Box::new(LaunchError { message: err })),
        }),
    )?;
    Ok(())
}

fn build_app(settings: AppSettings) -> Result<SoundboardApp, String> {
    let store =
        Arc::new(ApiKeyStore::new().map_err(|err| format!("Failed to open key store: {err}"))?);
    let client = Arc::new(GeminiClient::new(settings.gemini.clone(), store.clone()));
    let services = ControllerServices {
        synthesizer: client.clone(),
        deck_generator: client,
        credentials: store,
    };
    let controller = SoundboardController::new(&settings, services);
    Ok(SoundboardApp::new(controller, settings))
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to start Meme Roulette");
                ui.label(&self.message);
            });
        });
    }
}
