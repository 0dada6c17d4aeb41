pub mod about_dialog;
pub mod auto_stop_dialog;
pub mod confirmation;
pub mod options_dialog;
pub mod preferences_dialog;

use eframe::egui;

/// Renders a standard dialog footer with buttons aligned to the bottom-right.
///
/// Buttons are laid out right to left, so add them in reverse order.
pub fn dialog_footer(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.add_space(10.0);
    ui.separator();
    ui.add_space(5.0);
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), add_contents);
}

/// Outcome of an OK/Cancel dialog for this frame.
pub enum DialogResult<T> {
    Accepted(T),
    Cancelled,
}

pub(crate) fn dialog_window<'open>(title: &str) -> egui::Window<'open> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
}
