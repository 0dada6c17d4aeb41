use eframe::egui;
use timing_core::core::frame::{FPS_PRESETS, MAX_FPS, MIN_FPS};
use timing_core::model::{PLUGIN_NAME, PLUGIN_VERSION};

use super::{dialog_footer, dialog_window};

#[derive(Default)]
pub struct AboutDialog {
    pub is_open: bool,
}

impl AboutDialog {
    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.is_open {
            return;
        }

        let mut open = true;
        let mut close = false;
        dialog_window("About").open(&mut open).show(ctx, |ui| {
            ui.heading(PLUGIN_NAME);
            ui.label(format!("Version {}", PLUGIN_VERSION));
            ui.add_space(6.0);
            ui.label("Tap along with a motion and read it back in frames.");
            ui.label(format!(
                "Presets: {} fps. Custom rates from {} to {} fps.",
                FPS_PRESETS.map(|fps| fps.to_string()).join(", "),
                MIN_FPS,
                MAX_FPS
            ));
            ui.add_space(6.0);
            egui::Grid::new("about_shortcuts").num_columns(2).show(ui, |ui| {
                for (key, action) in [
                    ("Space", "Start, then capture"),
                    ("Esc", "Stop"),
                    ("Del", "Reset, or delete the selected rows"),
                ] {
                    ui.monospace(key);
                    ui.label(action);
                    ui.end_row();
                }
            });
            dialog_footer(ui, |ui| {
                if ui.button("Close").clicked() {
                    close = true;
                }
            });
        });

        if !open || close {
            self.is_open = false;
        }
    }
}
