use eframe::egui::{self, RichText};

use super::{SoundboardApp, style};

impl SoundboardApp {
    pub(super) fn render_history(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::SidePanel::right("history")
            .default_width(220.0)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.label(RichText::new("HISTORY").strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let has_entries = self.controller.history_len() > 0;
                        if ui.add_enabled(has_entries, egui::Button::new("FLUSH")).clicked() {
                            self.controller.flush_history();
                        }
                    });
                });
                ui.separator();
                if self.controller.history_len() == 0 {
                    ui.label(RichText::new("Nothing played yet").color(palette.text_muted));
                    return;
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for entry in self.controller.history() {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&entry.time).monospace().color(palette.text_muted));
                            ui.label(&entry.label);
                        });
                    }
                });
            });
    }
}
