//! egui front end for the soundboard.

mod board;
mod controls;
mod gate;
mod history_panel;
mod style;

use std::time::{Duration, Instant};

use eframe::egui;
use tracing::{info, warn};

use crate::audio::ResolvedOutput;
use crate::config::{self, AppSettings};
use crate::controller::SoundboardController;

/// Smallest window that still fits the control row and one column of tiles.
pub const MIN_VIEWPORT_SIZE: [f32; 2] = [520.0, 420.0];

const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Main window: renders controller state and forwards user actions to it.
pub struct SoundboardApp {
    controller: SoundboardController,
    settings: AppSettings,
    key_input: String,
    key_error: Option<String>,
    visuals_set: bool,
}

impl SoundboardApp {
    pub fn new(controller: SoundboardController, settings: AppSettings) -> Self {
        Self {
            controller,
            settings,
            key_input: String::new(),
            key_error: None,
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn render_status(&self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(message) = self.controller.status_message() {
                    ui.label(egui::RichText::new(message).color(palette.warning));
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let output = output_label(self.controller.engine().output_details());
                    ui.label(egui::RichText::new(output).small().color(palette.text_muted));
                });
            });
        });
    }
}

/// Status bar text for the audio device in use.
fn output_label(output: Option<&ResolvedOutput>) -> String {
    match output {
        Some(output) if output.used_fallback => {
            format!("{} ({}, fallback)", output.device_name, output.host_id)
        }
        Some(output) => format!("{} ({})", output.device_name, output.host_id),
        None => "No output open".to_string(),
    }
}

impl eframe::App for SoundboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        self.controller.tick(Instant::now());
        self.controller.poll_background_jobs();
        if self.controller.needs_credentials() {
            self.render_gate(ctx);
        } else {
            self.render_controls(ctx);
            self.render_status(ctx);
            self.render_history(ctx);
            self.render_board(ctx);
        }
        ctx.request_repaint_after(FRAME_INTERVAL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.stop_all();
        self.settings.volume = self.controller.volume();
        match config::save(&self.settings) {
            Ok(()) => info!("Settings saved"),
            Err(err) => warn!("Failed to save settings: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_label_names_the_device_and_flags_fallbacks() {
        let mut output = ResolvedOutput {
            host_id: "Alsa".to_string(),
            device_name: "default".to_string(),
            used_fallback: false,
        };
        assert_eq!(output_label(Some(&output)), "default (Alsa)");
        output.used_fallback = true;
        assert_eq!(output_label(Some(&output)), "default (Alsa, fallback)");
        assert_eq!(output_label(None), "No output open");
    }
}
