use eframe::egui;
use timing_core::core::clock::AutoStop;
use timing_core::core::frame;
use timing_core::TimingError;

use super::{dialog_footer, dialog_window, DialogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Disabled,
    AtTime,
    AtFrame,
}

pub struct AutoStopDialog {
    pub is_open: bool,
    mode: Mode,
    time: String,
    frame: u64,
    error: Option<String>,
}

impl Default for AutoStopDialog {
    fn default() -> Self {
        Self {
            is_open: false,
            mode: Mode::Disabled,
            time: "00:10:000".to_string(),
            frame: 24,
            error: None,
        }
    }
}

impl AutoStopDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, current: AutoStop) {
        match current {
            AutoStop::Disabled => self.mode = Mode::Disabled,
            AutoStop::AtTime(ms) => {
                self.mode = Mode::AtTime;
                if let Ok(text) = frame::format_time(ms as i64) {
                    self.time = text;
                }
            }
            AutoStop::AtFrame(n) => {
                self.mode = Mode::AtFrame;
                self.frame = n;
            }
        }
        self.error = None;
        self.is_open = true;
    }

    fn validate(&self) -> Result<AutoStop, TimingError> {
        match self.mode {
            Mode::Disabled => Ok(AutoStop::Disabled),
            Mode::AtTime => Ok(AutoStop::AtTime(frame::parse_time(&self.time)?)),
            Mode::AtFrame => Ok(AutoStop::AtFrame(self.frame)),
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<DialogResult<AutoStop>> {
        if !self.is_open {
            return None;
        }

        let mut result = None;
        let mut open = true;
        dialog_window("Auto Stop").open(&mut open).show(ctx, |ui| {
            ui.radio_value(&mut self.mode, Mode::Disabled, "No auto stop");
            ui.horizontal(|ui| {
                ui.radio_value(&mut self.mode, Mode::AtTime, "Stop at time");
                ui.add_enabled(
                    self.mode == Mode::AtTime,
                    egui::TextEdit::singleline(&mut self.time)
                        .hint_text("mm:ss:zzz")
                        .desired_width(90.0),
                );
            });
            ui.horizontal(|ui| {
                ui.radio_value(&mut self.mode, Mode::AtFrame, "Stop at frame");
                ui.add_enabled(
                    self.mode == Mode::AtFrame,
                    egui::DragValue::new(&mut self.frame).range(1..=u64::MAX),
                );
            });

            if let Some(error) = &self.error {
                ui.colored_label(egui::Color32::RED, error);
            }

            dialog_footer(ui, |ui| {
                if ui.button("OK").clicked() {
                    match self.validate() {
                        Ok(auto_stop) => result = Some(DialogResult::Accepted(auto_stop)),
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
    fn open_reflects_current_setting() {
        let mut dialog = AutoStopDialog::new();
        dialog.open(AutoStop::AtTime(2_500));
        assert_eq!(dialog.mode, Mode::AtTime);
        assert_eq!(dialog.time, "00:02:500");
        assert_eq!(dialog.validate().unwrap(), AutoStop::AtTime(2_500));

        dialog.open(AutoStop::AtFrame(48));
        assert_eq!(dialog.validate().unwrap(), AutoStop::AtFrame(48));
    }

    #[test]
    fn bad_time_is_reported() {
        let mut dialog = AutoStopDialog::new();
        dialog.open(AutoStop::Disabled);
        dialog.mode = Mode::AtTime;
        dialog.time = "soon".to_string();
        assert!(dialog.validate().is_err());
    }
}
