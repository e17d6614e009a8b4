use eframe::egui::{self, Button, RichText};

use super::{SoundboardApp, style};
use crate::soundboard::format_countdown;

impl SoundboardApp {
    /// Roulette toggle, evolution countdown, volume and the panic button.
    pub(super) fn render_controls(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let active = self.controller.roulette_active();
                let (text, fill) = if active {
                    (
                        format!("ACTIVE: {}S", self.controller.roulette_seconds_left()),
                        palette.accent_lime,
                    )
                } else {
                    ("ROULETTE".to_string(), palette.bg_tertiary)
                };
                let text_color = if active { palette.bg_primary } else { palette.text_primary };
                if ui
                    .add(Button::new(RichText::new(text).strong().color(text_color)).fill(fill))
                    .clicked()
                {
                    self.controller.toggle_roulette();
                }

                ui.separator();
                let refreshing = self.controller.is_refreshing();
                if refreshing {
                    ui.spinner();
                    ui.label(RichText::new("EVOLVING").color(palette.accent_hot));
                } else {
                    ui.label(format!(
                        "{} UNTIL EVOLUTION",
                        format_countdown(self.controller.deck_seconds_left())
                    ));
                }
                if ui.add_enabled(!refreshing, Button::new("RE-EVOLVE")).clicked() {
                    self.controller.refresh_deck();
                }

                ui.separator();
                let mut volume = self.controller.volume();
                let slider = egui::Slider::new(&mut volume, 0.0..=1.0)
                    .show_value(false)
                    .text("VOL");
                if ui.add(slider).changed() {
                    self.controller.set_volume(volume);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let panic = Button::new(RichText::new("PANIC").strong().color(palette.text_primary))
                        .fill(palette.warning);
                    if ui.add(panic).on_hover_text("Stop every sound").clicked() {
                        self.controller.stop_all();
                    }
                });
            });
            ui.add_space(6.0);
        });
    }
}
