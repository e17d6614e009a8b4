use eframe::egui::{Color32, Stroke, Visuals, epaint::CornerRadius};

#[derive(Clone, Copy)]
pub struct Palette {
    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,
    pub panel_outline: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub accent_lime: Color32,
    pub accent_hot: Color32,
    pub warning: Color32,
    pub cached: Color32,
}

pub fn palette() -> Palette {
    Palette {
        bg_primary: Color32::from_rgb(9, 9, 11),
        bg_secondary: Color32::from_rgb(20, 20, 24),
        bg_tertiary: Color32::from_rgb(39, 39, 42),
        panel_outline: Color32::from_rgb(52, 52, 58),
        text_primary: Color32::from_rgb(228, 228, 231),
        text_muted: Color32::from_rgb(140, 140, 150),
        accent_lime: Color32::from_rgb(163, 230, 53),
        accent_hot: Color32::from_rgb(236, 72, 153),
        warning: Color32::from_rgb(239, 68, 68),
        cached: Color32::from_rgb(52, 211, 153),
    }
}

pub fn apply_visuals(visuals: &mut Visuals) {
    let palette = palette();
    visuals.window_fill = palette.bg_primary;
    visuals.panel_fill = palette.bg_secondary;
    visuals.override_text_color = Some(palette.text_primary);
    visuals.extreme_bg_color = palette.bg_primary;
    visuals.error_fg_color = palette.warning;
    visuals.warn_fg_color = palette.warning;
    visuals.selection.stroke = Stroke::new(1.0, palette.accent_lime);
    visuals.widgets.inactive.bg_fill = palette.bg_tertiary;
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, palette.panel_outline);
    visuals.window_corner_radius = CornerRadius::same(6);
}

/// Fill color for an item's color tag. Unknown tags get the neutral tile color.
pub fn tag_color(tag: &str) -> Color32 {
    match tag {
        "bg-slate-700" => Color32::from_rgb(51, 65, 85),
        "bg-pink-600" => Color32::from_rgb(219, 39, 119),
        "bg-red-600" => Color32::from_rgb(220, 38, 38),
        "bg-blue-500" => Color32::from_rgb(59, 130, 246),
        "bg-yellow-500" => Color32::from_rgb(234, 179, 8),
        "bg-orange-600" => Color32::from_rgb(234, 88, 12),
        "bg-indigo-700" => Color32::from_rgb(67, 56, 202),
        "bg-amber-600" => Color32::from_rgb(217, 119, 6),
        "bg-emerald-600" => Color32::from_rgb(5, 150, 105),
        "bg-purple-700" => Color32::from_rgb(126, 34, 206),
        "bg-lime-600" => Color32::from_rgb(101, 163, 13),
        "bg-rose-400" => Color32::from_rgb(251, 113, 133),
        _ => palette().bg_tertiary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soundboard::COLOR_TAGS;

    #[test]
    fn every_generator_tag_has_its_own_color() {
        let fallback = palette().bg_tertiary;
        let mut seen = Vec::new();
        for tag in COLOR_TAGS {
            let color = tag_color(tag);
            assert_ne!(color, fallback, "{tag} falls back");
            assert!(!seen.contains(&color), "{tag} reuses a color");
            seen.push(color);
        }
    }

    #[test]
    fn unknown_tags_use_the_tile_color() {
        assert_eq!(tag_color("bg-chartreuse-900"), palette().bg_tertiary);
    }
}
