use eframe::egui;
use std::path::PathBuf;
use timing_core::core::frame::{FPS_PRESETS, MAX_FPS, MIN_FPS};
use timing_core::settings::{Preferences, MAX_RECENT_LIMIT};

use super::{dialog_footer, dialog_window, DialogResult};

pub struct PreferencesDialog {
    pub is_open: bool,
    editing: Preferences,
    directory: String,
}

impl Default for PreferencesDialog {
    fn default() -> Self {
        Self {
            is_open: false,
            editing: Preferences::default(),
            directory: String::new(),
        }
    }
}

impl PreferencesDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, current: &Preferences) {
        self.editing = current.clone();
        self.directory = current
            .default_directory
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        self.is_open = true;
    }

    fn collect(&self) -> Preferences {
        let directory = self.directory.trim();
        Preferences {
            default_directory: (!directory.is_empty()).then(|| PathBuf::from(directory)),
            ..self.editing.clone()
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<DialogResult<Preferences>> {
        if !self.is_open {
            return None;
        }

        let mut result = None;
        let mut open = true;
        dialog_window("Preferences").open(&mut open).show(ctx, |ui| {
            egui::Grid::new("preferences_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Default frame rate");
                    ui.horizontal(|ui| {
                        egui::ComboBox::from_id_salt("preferences_fps")
                            .selected_text(format!("{} fps", self.editing.default_fps))
                            .show_ui(ui, |ui| {
                                for preset in FPS_PRESETS {
                                    ui.selectable_value(
                                        &mut self.editing.default_fps,
                                        preset,
                                        format!("{} fps", preset),
                                    );
                                }
                            });
                        ui.add(
                            egui::DragValue::new(&mut self.editing.default_fps)
                                .range(MIN_FPS..=MAX_FPS),
                        );
                    });
                    ui.end_row();

                    ui.label("Default directory");
                    ui.horizontal(|ui| {
                        ui.add(egui::TextEdit::singleline(&mut self.directory).desired_width(180.0));
                        if ui.button("Browse...").clicked() {
                            let mut dialog = rfd::FileDialog::new();
                            if !self.directory.trim().is_empty() {
                                dialog = dialog.set_directory(self.directory.trim());
                            }
                            if let Some(dir) = dialog.pick_folder() {
                                self.directory = dir.display().to_string();
                            }
                        }
                    });
                    ui.end_row();

                    ui.label("Recent timings");
                    ui.add(
                        egui::DragValue::new(&mut self.editing.max_recent_timing)
                            .range(0..=MAX_RECENT_LIMIT),
                    );
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.checkbox(
                &mut self.editing.auto_load_last_timing,
                "Open the last timing on startup",
            );
            ui.checkbox(
                &mut self.editing.project_save_in_dirs,
                "Save timings next to the current project",
            );
            ui.checkbox(
                &mut self.editing.stop_timer_on_focus_out,
                "Stop the timer when the window loses focus",
            );

            dialog_footer(ui, |ui| {
                if ui.button("Save").clicked() {
                    result = Some(DialogResult::Accepted(self.collect()));
                }
                if ui.button("Cancel").clicked() {
                    result = Some(DialogResult::Cancelled);
                }
                ui.with_layout(egui::Layout::left_to_right(egui::Align::Center), |ui| {
                    if ui.button("Restore Defaults").clicked() {
                        self.editing = Preferences::default();
                        self.directory.clear();
                    }
                });
            });
        });

        if !open {
            result = Some(DialogResult::Cancelled);
        }
        if result.is_some() {
            self.is_open = false;
        }
        result
    }
}
