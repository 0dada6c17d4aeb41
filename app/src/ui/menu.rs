use eframe::egui::{self, Button};
use std::path::PathBuf;

use crate::command::{CommandId, CommandRegistry};
use crate::config::WindowSettings;

#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    Command(CommandId),
    OpenRecent(PathBuf),
    ClearRecent,
}

pub struct MenuState<'a> {
    pub recent: &'a [PathBuf],
    pub has_selection: bool,
    pub has_offsets: bool,
    pub is_dirty: bool,
}

pub fn menu_bar(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    state: &MenuState<'_>,
    window: &mut WindowSettings,
    triggered_action: &mut Option<MenuAction>,
) {
    egui::MenuBar::new().ui(ui, |ui| {
        file_menu(ui, command_registry, state, triggered_action);
        edit_menu(ui, command_registry, state, triggered_action);
        view_menu(ui, command_registry, window, triggered_action);
        ui.menu_button("Help", |ui| {
            command_button(ui, command_registry, CommandId::About, true, triggered_action);
        });
    });
}

fn command_button(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    cmd_id: CommandId,
    enabled: bool,
    triggered_action: &mut Option<MenuAction>,
) {
    if let Some(cmd) = command_registry.find(cmd_id) {
        let button = Button::new(cmd.text).shortcut_text(cmd.shortcut_text);
        if ui.add_enabled(enabled, button).clicked() {
            *triggered_action = Some(MenuAction::Command(cmd.id));
            ui.close();
        }
    }
}

fn file_menu(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    state: &MenuState<'_>,
    triggered_action: &mut Option<MenuAction>,
) {
    ui.menu_button("File", |ui| {
        command_button(ui, command_registry, CommandId::NewTiming, true, triggered_action);
        command_button(ui, command_registry, CommandId::OpenTiming, true, triggered_action);

        ui.add_enabled_ui(!state.recent.is_empty(), |ui| {
            ui.menu_button("Open Recent", |ui| {
                for path in state.recent {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.display().to_string());
                    let response = ui.button(name).on_hover_text(path.display().to_string());
                    if response.clicked() {
                        *triggered_action = Some(MenuAction::OpenRecent(path.clone()));
                        ui.close();
                    }
                }
                ui.separator();
                if ui.button("Clear Recent Timings").clicked() {
                    *triggered_action = Some(MenuAction::ClearRecent);
                    ui.close();
                }
            });
        });

        ui.separator();
        command_button(ui, command_registry, CommandId::Save, true, triggered_action);
        command_button(ui, command_registry, CommandId::SaveAs, true, triggered_action);
        command_button(
            ui,
            command_registry,
            CommandId::DiscardChanges,
            state.is_dirty,
            triggered_action,
        );
        ui.separator();
        command_button(ui, command_registry, CommandId::Quit, true, triggered_action);
    });
}

fn edit_menu(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    state: &MenuState<'_>,
    triggered_action: &mut Option<MenuAction>,
) {
    ui.menu_button("Edit", |ui| {
        command_button(
            ui,
            command_registry,
            CommandId::DeleteSelectedRows,
            state.has_selection,
            triggered_action,
        );
        command_button(
            ui,
            command_registry,
            CommandId::ResetOffsets,
            state.has_offsets,
            triggered_action,
        );
        ui.separator();
        command_button(ui, command_registry, CommandId::Options, true, triggered_action);
        command_button(ui, command_registry, CommandId::AutoStop, true, triggered_action);
        command_button(ui, command_registry, CommandId::Preferences, true, triggered_action);
    });
}

fn view_menu(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    window: &mut WindowSettings,
    triggered_action: &mut Option<MenuAction>,
) {
    ui.menu_button("View", |ui| {
        ui.checkbox(&mut window.show_interval, "Interval Column");
        ui.checkbox(&mut window.show_note, "Note Column");
        ui.separator();
        ui.checkbox(&mut window.always_on_top, "Always on Top");
        command_button(ui, command_registry, CommandId::ResetWindowSize, true, triggered_action);
    });
}
