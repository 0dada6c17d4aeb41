use eframe::egui;
use timing_core::core::frame::{self, FPS_PRESETS, MAX_FPS, MIN_FPS};
use timing_core::TimingError;

use super::{dialog_footer, dialog_window, DialogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FpsChoice {
    Preset(u32),
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingOptions {
    pub fps: u32,
    pub offset_time_ms: u64,
    pub offset_frame: u64,
}

/// Frame rate and start offsets of the current timing.
pub struct OptionsDialog {
    pub is_open: bool,
    choice: FpsChoice,
    custom_fps: u32,
    offset_time: String,
    offset_frame: u64,
    error: Option<String>,
}

impl Default for OptionsDialog {
    fn default() -> Self {
        Self {
            is_open: false,
            choice: FpsChoice::Preset(frame::DEFAULT_FPS),
            custom_fps: frame::DEFAULT_FPS,
            offset_time: "00:00:000".to_string(),
            offset_frame: 0,
            error: None,
        }
    }
}

impl OptionsDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, current: TimingOptions) {
        self.choice = if frame::is_preset(current.fps) {
            FpsChoice::Preset(current.fps)
        } else {
            FpsChoice::Custom
        };
        self.custom_fps = current.fps;
        self.offset_time = frame::format_time(current.offset_time_ms as i64)
            .unwrap_or_else(|_| "00:00:000".to_string());
        self.offset_frame = current.offset_frame;
        self.error = None;
        self.is_open = true;
    }

    fn fps(&self) -> u32 {
        match self.choice {
            FpsChoice::Preset(fps) => fps,
            FpsChoice::Custom => self.custom_fps,
        }
    }

    fn validate(&self) -> Result<TimingOptions, TimingError> {
        let fps = frame::validate_fps(self.fps())?;
        let offset_time_ms = frame::parse_time(&self.offset_time)?;
        Ok(TimingOptions {
            fps,
            offset_time_ms,
            offset_frame: self.offset_frame,
        })
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<DialogResult<TimingOptions>> {
        if !self.is_open {
            return None;
        }

        let mut result = None;
        let mut open = true;
        dialog_window("Options").open(&mut open).show(ctx, |ui| {
            egui::Grid::new("options_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Frame rate");
                    ui.horizontal(|ui| {
                        let selected = match self.choice {
                            FpsChoice::Preset(fps) => format!("{} fps", fps),
                            FpsChoice::Custom => "Custom".to_string(),
                        };
                        egui::ComboBox::from_id_salt("options_fps")
                            .selected_text(selected)
                            .show_ui(ui, |ui| {
                                for preset in FPS_PRESETS {
                                    ui.selectable_value(
                                        &mut self.choice,
                                        FpsChoice::Preset(preset),
                                        format!("{} fps", preset),
                                    );
                                }
                                ui.selectable_value(&mut self.choice, FpsChoice::Custom, "Custom");
                            });
                        if self.choice == FpsChoice::Custom {
                            ui.add(
                                egui::DragValue::new(&mut self.custom_fps)
                                    .range(MIN_FPS..=MAX_FPS)
                                    .suffix(" fps"),
                            );
                        }
                    });
                    ui.end_row();

                    ui.label("Offset time");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.offset_time)
                            .hint_text("mm:ss:zzz")
                            .desired_width(90.0),
                    );
                    ui.end_row();

                    ui.label("Offset frame");
                    ui.add(egui::DragValue::new(&mut self.offset_frame));
                    ui.end_row();
                });

            if let Some(error) = &self.error {
                ui.colored_label(egui::Color32::RED, error);
            }

            dialog_footer(ui, |ui| {
                if ui.button("OK").clicked() {
                    match self.validate() {
                        Ok(options) => result = Some(DialogResult::Accepted(options)),
                        Err(e) => self.error = Some(e.to_string()),
                    }
                }
                if ui.button("Cancel").clicked() {
                    result = Some(DialogResult::Cancelled);
                }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_picks_preset_or_custom() {
        let mut dialog = OptionsDialog::new();
        dialog.open(TimingOptions {
            fps: 30,
            offset_time_ms: 1_500,
            offset_frame: 4,
        });
        assert_eq!(dialog.choice, FpsChoice::Preset(30));
        assert_eq!(dialog.offset_time, "00:01:500");

        dialog.open(TimingOptions {
            fps: 23,
            offset_time_ms: 0,
            offset_frame: 0,
        });
        assert_eq!(dialog.choice, FpsChoice::Custom);
        assert_eq!(dialog.fps(), 23);
    }

    #[test]
    fn validate_rejects_bad_input() {
        let mut dialog = OptionsDialog::new();
        dialog.open(TimingOptions {
            fps: 24,
            offset_time_ms: 0,
            offset_frame: 0,
        });
        dialog.offset_time = "1:2".to_string();
        assert!(dialog.validate().is_err());

        dialog.offset_time = "00:02:000".to_string();
        dialog.choice = FpsChoice::Custom;
        dialog.custom_fps = 500;
        assert!(matches!(dialog.validate(), Err(TimingError::InvalidFps(500))));

        dialog.custom_fps = 100;
        assert_eq!(
            dialog.validate().unwrap(),
            TimingOptions {
                fps: 100,
                offset_time_ms: 2_000,
                offset_frame: 0
            }
        );
    }
}
