use eframe::egui::{self, Color32, FontFamily, FontId, Rounding, Shadow, Stroke, Vec2};
use image_junction::batch::ItemStatus;

pub struct StudioTheme {
    // Colors
    pub background: Color32,
    pub surface: Color32,
    pub surface_hover: Color32,
    pub card: Color32,
    pub border: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,
    pub accent: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,

    // Spacing
    pub spacing_small: f32,
    pub spacing_medium: f32,
    pub spacing_large: f32,
    pub padding_medium: f32,

    pub radius_small: Rounding,
    pub radius_medium: Rounding,
    pub shadow: Shadow,

    pub font_small: FontId,
    pub font_body: FontId,
    pub font_title: FontId,

    /// Width of the before/after previews.
    pub preview_width: f32,
}

impl Default for StudioTheme {
    fn default() -> Self {
        Self {
            // Neutral greys so product colours in the previews read true
            background: Color32::from_rgb(36, 37, 40),
            surface: Color32::from_rgb(50, 52, 56),
            surface_hover: Color32::from_rgb(62, 64, 69),
            card: Color32::from_rgb(44, 45, 49),
            border: Color32::from_rgb(74, 76, 82),
            text_primary: Color32::from_rgb(240, 240, 240),
            text_secondary: Color32::from_rgb(196, 198, 204),
            text_muted: Color32::from_rgb(138, 141, 148),
            accent: Color32::from_rgb(255, 128, 40),
            success: Color32::from_rgb(72, 199, 116),
            warning: Color32::from_rgb(245, 180, 60),
            error: Color32::from_rgb(235, 77, 75),

            spacing_small: 4.0,
            spacing_medium: 8.0,
            spacing_large: 14.0,
            padding_medium: 10.0,

            radius_small: Rounding::same(4.0),
            radius_medium: Rounding::same(8.0),
            shadow: Shadow {
                offset: Vec2::new(0.0, 2.0),
                blur: 8.0,
                spread: 0.0,
                color: Color32::from_black_alpha(40),
            },

            font_small: FontId::new(12.0, FontFamily::Proportional),
            font_body: FontId::new(14.0, FontFamily::Proportional),
            font_title: FontId::new(22.0, FontFamily::Proportional),

            preview_width: 260.0,
        }
    }
}

impl StudioTheme {
    pub fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.background;
        style.visuals.window_shadow = self.shadow;
        style.visuals.window_rounding = self.radius_medium;

        for widget in [
            &mut style.visuals.widgets.inactive,
            &mut style.visuals.widgets.hovered,
            &mut style.visuals.widgets.active,
        ] {
            widget.fg_stroke = Stroke::new(1.0, self.text_primary);
            widget.rounding = self.radius_small;
        }
        style.visuals.widgets.inactive.bg_fill = self.surface;
        style.visuals.widgets.inactive.weak_bg_fill = self.surface;
        style.visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, self.border);
        style.visuals.widgets.hovered.bg_fill = self.surface_hover;
        style.visuals.widgets.hovered.weak_bg_fill = self.surface_hover;
        style.visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent);
        style.visuals.widgets.active.bg_fill = self.surface_hover;
        style.visuals.widgets.active.bg_stroke = Stroke::new(1.0, self.accent);

        style.visuals.selection.bg_fill = self.accent;
        style.visuals.selection.stroke = Stroke::new(1.0, self.text_primary);
        style.visuals.text_cursor.stroke = Stroke::new(2.0, self.accent);
        style.visuals.hyperlink_color = self.accent;

        style.text_styles = [
            (egui::TextStyle::Heading, self.font_title.clone()),
            (egui::TextStyle::Body, self.font_body.clone()),
            (
                egui::TextStyle::Monospace,
                FontId::new(13.0, FontFamily::Monospace),
            ),
            (egui::TextStyle::Button, self.font_body.clone()),
            (egui::TextStyle::Small, self.font_small.clone()),
        ]
        .into();

        ctx.set_style(style);
    }

    pub fn card_frame(&self) -> egui::Frame {
        egui::Frame {
            inner_margin: egui::Margin::symmetric(self.padding_medium, self.padding_medium),
            rounding: self.radius_medium,
            shadow: self.shadow,
            fill: self.card,
            stroke: Stroke::new(1.0, self.border),
            ..Default::default()
        }
    }

    pub fn status_label(&self, status: &ItemStatus) -> (String, Color32) {
        match status {
            ItemStatus::Queued => ("Queued".to_string(), self.text_muted),
            ItemStatus::Processing => ("Processing...".to_string(), self.warning),
            ItemStatus::Completed => ("✅ Done".to_string(), self.success),
            ItemStatus::Failed(msg) => (format!("❌ {}", msg), self.error),
        }
    }
}
