use crate::command::{CommandId, CommandRegistry};
use eframe::egui::Context;

pub struct ShortcutManager;

impl ShortcutManager {
    pub fn new() -> Self {
        Self
    }

    /// Consumes the first matching shortcut of this frame.
    ///
    /// Nothing fires while a text field has focus, so Space and Delete keep
    /// working inside the note and frame cells.
    pub fn handle_shortcuts(&self, ctx: &Context, registry: &CommandRegistry) -> Option<CommandId> {
        if ctx.wants_keyboard_input() {
            return None;
        }
        for cmd in &registry.commands {
            if let Some((modifiers, key)) = cmd.shortcut {
                if ctx.input_mut(|i| i.consume_key(modifiers, key)) {
                    return Some(cmd.id);
                }
            }
        }
        None
    }
}
