use eframe::egui::{self, Button, RichText, Stroke, vec2};

use super::{SoundboardApp, style};
use crate::soundboard::SoundboardItem;

const TILE_SIZE: egui::Vec2 = vec2(150.0, 96.0);
const TILE_SPACING: f32 = 10.0;

impl SoundboardApp {
    /// The grid of sound tiles.
    pub(super) fn render_board(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        let items: Vec<SoundboardItem> = self.controller.items().to_vec();
        let mut pressed = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let columns = ((ui.available_width() + TILE_SPACING) / (TILE_SIZE.x + TILE_SPACING))
                .floor()
                .max(1.0) as usize;
            egui::ScrollArea::vertical().show(ui, |ui| {
                egui::Grid::new("sound_tiles")
                    .spacing(vec2(TILE_SPACING, TILE_SPACING))
                    .show(ui, |ui| {
                        for row in items.chunks(columns) {
                            for item in row {
                                if self.render_tile(ui, item, palette) {
                                    pressed = Some(item.id.clone());
                                }
                            }
                            ui.end_row();
                        }
                    });
            });
        });
        if let Some(id) = pressed {
            self.controller.play(&id);
        }
    }

    fn render_tile(&self, ui: &mut egui::Ui, item: &SoundboardItem, palette: style::Palette) -> bool {
        let active = self.controller.active_id() == Some(item.id.as_str());
        let loading = self.controller.loading_id() == Some(item.id.as_str());
        let enabled = self.controller.is_item_enabled(&item.id);
        let text = RichText::new(format!("{}\n{}", item.emoji, item.label))
            .size(16.0)
            .strong()
            .color(palette.text_primary);
        let stroke = if active {
            Stroke::new(3.0, palette.accent_lime)
        } else {
            Stroke::new(1.0, palette.panel_outline)
        };
        let response = ui
            .add_enabled(
                enabled,
                Button::new(text)
                    .fill(style::tag_color(&item.color))
                    .stroke(stroke)
                    .min_size(TILE_SIZE),
            )
            .on_hover_text(&item.prompt);
        if self.controller.is_cached(&item.id) {
            ui.painter()
                .circle_filled(response.rect.left_top() + vec2(10.0, 10.0), 4.0, palette.cached);
        }
        if loading {
            let spot = egui::Rect::from_center_size(
                response.rect.right_top() + vec2(-14.0, 14.0),
                vec2(16.0, 16.0),
            );
            ui.put(spot, egui::Spinner::new().size(14.0));
        }
        response.clicked()
    }
}
