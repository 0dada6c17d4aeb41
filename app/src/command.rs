use eframe::egui::{Key, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    // File Menu
    NewTiming,
    OpenTiming,
    Save,
    SaveAs,
    DiscardChanges,
    Quit,

    // Edit Menu
    DeleteSelectedRows,
    ResetOffsets,
    Preferences,

    // View Menu
    ResetWindowSize,

    // Help Menu
    About,

    // Timer
    StartOrCapture,
    Stop,
    Reset,
    Options,
    AutoStop,
}

pub struct Command {
    pub id: CommandId,
    pub text: &'static str,
    pub shortcut: Option<(Modifiers, Key)>,
    pub shortcut_text: &'static str,
}

pub struct CommandRegistry {
    pub commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let commands = vec![
            // File Menu
            Command {
                id: CommandId::NewTiming,
                text: "New",
                shortcut: Some((Modifiers::COMMAND, Key::N)),
                shortcut_text: "Ctrl+N",
            },
            Command {
                id: CommandId::OpenTiming,
                text: "Open...",
                shortcut: Some((Modifiers::COMMAND, Key::O)),
                shortcut_text: "Ctrl+O",
            },
            Command {
                id: CommandId::Save,
                text: "Save",
                shortcut: Some((Modifiers::COMMAND, Key::S)),
                shortcut_text: "Ctrl+S",
            },
            Command {
                id: CommandId::SaveAs,
                text: "Save As...",
                shortcut: Some((Modifiers::COMMAND | Modifiers::SHIFT, Key::S)),
                shortcut_text: "Ctrl+Shift+S",
            },
            Command {
                id: CommandId::DiscardChanges,
                text: "Discard Changes",
                shortcut: None,
                shortcut_text: "",
            },
            Command {
                id: CommandId::Quit,
                text: "Quit",
                shortcut: Some((Modifiers::COMMAND, Key::Q)),
                shortcut_text: "Ctrl+Q",
            },
            // Edit Menu
            Command {
                id: CommandId::DeleteSelectedRows,
                text: "Delete Selected Rows",
                shortcut: None,
                shortcut_text: "Del",
            },
            Command {
                id: CommandId::ResetOffsets,
                text: "Reset Offsets",
                shortcut: None,
                shortcut_text: "",
            },
            Command {
                id: CommandId::Preferences,
                text: "Preferences...",
                shortcut: None,
                shortcut_text: "",
            },
            // View Menu
            Command {
                id: CommandId::ResetWindowSize,
                text: "Reset Window Size",
                shortcut: None,
                shortcut_text: "",
            },
            // Help Menu
            Command {
                id: CommandId::About,
                text: "About Animation Timer",
                shortcut: None,
                shortcut_text: "",
            },
            // Timer buttons, no menu item
            Command {
                id: CommandId::StartOrCapture,
                text: "Start",
                shortcut: Some((Modifiers::NONE, Key::Space)),
                shortcut_text: "Space",
            },
            Command {
                id: CommandId::Stop,
                text: "Stop",
                shortcut: Some((Modifiers::NONE, Key::Escape)),
                shortcut_text: "Esc",
            },
            // Del resets, or deletes the selected rows when there are any
            Command {
                id: CommandId::Reset,
                text: "Reset",
                shortcut: Some((Modifiers::NONE, Key::Delete)),
                shortcut_text: "Del",
            },
            Command {
                id: CommandId::Options,
                text: "Options...",
                shortcut: None,
                shortcut_text: "",
            },
            Command {
                id: CommandId::AutoStop,
                text: "Auto Stop...",
                shortcut: None,
                shortcut_text: "",
            },
        ];
        Self { commands }
    }

    pub fn find(&self, id: CommandId) -> Option<&Command> {
        self.commands.iter().find(|&cmd| cmd.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn shortcuts_are_unique() {
        let registry = CommandRegistry::new();
        let mut seen = HashSet::new();
        for cmd in &registry.commands {
            if let Some(shortcut) = cmd.shortcut {
                assert!(seen.insert(shortcut), "{:?} shares its shortcut", cmd.id);
            }
        }
    }

    #[test]
    fn every_menu_command_is_registered() {
        let registry = CommandRegistry::new();
        for id in [
            CommandId::NewTiming,
            CommandId::OpenTiming,
            CommandId::Save,
            CommandId::SaveAs,
            CommandId::DiscardChanges,
            CommandId::Quit,
            CommandId::DeleteSelectedRows,
            CommandId::ResetOffsets,
            CommandId::Preferences,
            CommandId::ResetWindowSize,
            CommandId::About,
        ] {
            assert!(registry.find(id).is_some(), "{:?} missing", id);
        }
    }
}
