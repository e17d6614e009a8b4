use eframe::egui::{self, RichText};
use tracing::warn;

use super::{SoundboardApp, style};

impl SoundboardApp {
    /// Key entry shown while no API key is available.
    pub(super) fn render_gate(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(48.0);
                ui.heading(RichText::new("MEME ROULETTE").strong().color(palette.accent_lime));
                ui.add_space(12.0);
                ui.label("A Gemini API key is required to generate sounds.");
                if let Some(reason) = self.controller.status_message() {
                    ui.label(RichText::new(reason).color(palette.text_muted));
                }
                ui.add_space(12.0);
                let field = ui.add(
                    egui::TextEdit::singleline(&mut self.key_input)
                        .password(true)
                        .hint_text("API key")
                        .desired_width(280.0),
                );
                let entered =
                    field.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
                ui.add_space(8.0);
                let has_input = !self.key_input.trim().is_empty();
                let save = ui.add_enabled(has_input, egui::Button::new("SAVE KEY")).clicked();
                if (save || entered) && has_input {
                    self.submit_key();
                }
                if ui.button("CHECK AGAIN").clicked() && !self.controller.check_credentials() {
                    self.key_error = Some("Still no API key available".to_string());
                }
                if let Some(err) = &self.key_error {
                    ui.add_space(8.0);
                    ui.label(RichText::new(err).color(palette.warning));
                }
            });
        });
    }

    fn submit_key(&mut self) {
        let key = self.key_input.trim().to_string();
        match self.controller.submit_api_key(&key) {
            Ok(true) => {
                self.key_input.clear();
                self.key_error = None;
            }
            Ok(false) => {
                self.key_error = Some("Key was saved but could not be read back".to_string());
            }
            Err(err) => {
                warn!("Failed to store API key: {err}");
                self.key_error = Some(format!("Could not save key: {err}"));
            }
        }
    }
}
