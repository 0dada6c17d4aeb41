use eframe::egui;
use std::path::PathBuf;

use super::{dialog_footer, dialog_window};

/// What to do once the user agrees to drop unsaved changes.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfirmationAction {
    NewTiming,
    Open(PathBuf),
    DiscardChanges,
    Quit,
}

#[derive(Clone, Debug)]
pub struct ConfirmationDialog {
    pub is_open: bool,
    pub title: String,
    pub message: String,
    pub action: Option<ConfirmationAction>,
}

impl Default for ConfirmationDialog {
    fn default() -> Self {
        Self {
            is_open: false,
            title: "Unsaved Changes".to_string(),
            message: "The current timing has unsaved changes.".to_string(),
            action: None,
        }
    }
}

impl ConfirmationDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, action: ConfirmationAction) {
        self.message = match &action {
            ConfirmationAction::NewTiming => {
                "The current timing has unsaved changes. Start a new one anyway?".to_string()
            }
            ConfirmationAction::Open(path) => format!(
                "The current timing has unsaved changes. Open {} anyway?",
                path.display()
            ),
            ConfirmationAction::DiscardChanges => {
                "Drop every change since the last save?".to_string()
            }
            ConfirmationAction::Quit => {
                "The current timing has unsaved changes. Quit anyway?".to_string()
            }
        };
        self.action = Some(action);
        self.is_open = true;
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<ConfirmationAction> {
        let mut confirmed_action = None;
        let mut should_close = false;

        if self.is_open {
            let mut open = true;
            dialog_window(&self.title)
                .open(&mut open)
                .show(ctx, |ui| {
                    ui.label(&self.message);
                    dialog_footer(ui, |ui| {
                        if ui
                            .button(egui::RichText::new("Discard").color(egui::Color32::RED))
                            .clicked()
                        {
                            confirmed_action = self.action.clone();
                            should_close = true;
                        }
                        if ui.button("Cancel").clicked() {
                            should_close = true;
                        }
                    });
                });

            if !open {
                should_close = true;
            }
        }

        if should_close {
            self.is_open = false;
            self.action = None;
        }

        confirmed_action
    }
}
