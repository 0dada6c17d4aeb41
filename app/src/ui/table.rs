use eframe::egui::{self, Align, Key, Layout, Sense};
use egui_extras::{Column, TableBuilder};
use std::collections::BTreeSet;
use timing_core::TimingRow;

use crate::config::WindowSettings;

const ROW_HEIGHT: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditColumn {
    Frame,
    Note,
}

struct CellEdit {
    row: usize,
    column: EditColumn,
    text: String,
    focused: bool,
}

/// Committed cell edits, applied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEdit {
    Frame { row: usize, text: String },
    Note { row: usize, text: String },
}

/// Captured rows with multi-row selection and double-click editing of the
/// frame and note cells.
#[derive(Default)]
pub struct TimingTable {
    selected: BTreeSet<usize>,
    editing: Option<CellEdit>,
}

impl TimingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_rows(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Drops selection and any cell being edited, e.g. after the rows changed wholesale.
    pub fn reset(&mut self) {
        self.selected.clear();
        self.editing = None;
    }

    fn select(&mut self, row: usize, additive: bool) {
        if additive {
            if !self.selected.remove(&row) {
                self.selected.insert(row);
            }
        } else {
            self.selected.clear();
            self.selected.insert(row);
        }
    }

    fn begin_edit(&mut self, row: usize, column: EditColumn, current: String) {
        self.editing = Some(CellEdit {
            row,
            column,
            text: current,
            focused: false,
        });
    }

    /// Draws the table. Returns the edit committed this frame, if any.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        rows: &[TimingRow],
        window: &WindowSettings,
        editable: bool,
    ) -> Option<TableEdit> {
        self.selected.retain(|row| *row < rows.len());
        if self.editing.as_ref().is_some_and(|e| e.row >= rows.len() || !editable) {
            self.editing = None;
        }

        let mut committed = None;
        let mut clicked: Option<(usize, bool)> = None;
        let mut edit_request: Option<(usize, EditColumn)> = None;
        let additive = ui.input(|i| i.modifiers.command || i.modifiers.shift);

        let mut builder = TableBuilder::new(ui)
            .striped(true)
            .stick_to_bottom(true)
            .sense(Sense::click())
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::exact(28.0))
            .column(Column::auto().at_least(72.0))
            .column(Column::auto().at_least(52.0));
        if window.show_interval {
            builder = builder.column(Column::auto().at_least(52.0));
        }
        if window.show_note {
            builder = builder.column(Column::remainder().at_least(60.0));
        }

        builder
            .header(ROW_HEIGHT, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("Time");
                });
                header.col(|ui| {
                    ui.strong("Frame");
                });
                if window.show_interval {
                    header.col(|ui| {
                        ui.strong("Interval");
                    });
                }
                if window.show_note {
                    header.col(|ui| {
                        ui.strong("Note");
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut table_row| {
                    let index = table_row.index();
                    let row = &rows[index];
                    table_row.set_selected(self.selected.contains(&index));

                    table_row.col(|ui| {
                        ui.weak((index + 1).to_string());
                    });
                    table_row.col(|ui| {
                        ui.monospace(row.time());
                    });

                    let (_, frame_cell) = table_row.col(|ui| {
                        if let Some(edit) = self.editing_cell(index, EditColumn::Frame) {
                            committed = committed.take().or(edit_cell(ui, edit));
                        } else {
                            ui.label(row.frame.to_string());
                        }
                    });
                    if frame_cell.double_clicked() {
                        edit_request = Some((index, EditColumn::Frame));
                    }

                    if window.show_interval {
                        table_row.col(|ui| {
                            let text = row
                                .interval
                                .map(|n| n.to_string())
                                .unwrap_or_else(|| "-".to_string());
                            ui.label(text);
                        });
                    }

                    if window.show_note {
                        let (_, note_cell) = table_row.col(|ui| {
                            if let Some(edit) = self.editing_cell(index, EditColumn::Note) {
                                committed = committed.take().or(edit_cell(ui, edit));
                            } else {
                                ui.label(&row.note);
                            }
                        });
                        if note_cell.double_clicked() {
                            edit_request = Some((index, EditColumn::Note));
                        }
                    }

                    if table_row.response().clicked() {
                        clicked = Some((index, additive));
                    }
                });
            });

        if let Some(outcome) = committed.take() {
            self.editing = None;
            if let EditOutcome::Commit(row, column, text) = outcome {
                return Some(match column {
                    EditColumn::Frame => TableEdit::Frame { row, text },
                    EditColumn::Note => TableEdit::Note { row, text },
                });
            }
        }

        if let Some((row, additive)) = clicked {
            self.select(row, additive);
        }
        if let (Some((row, column)), true) = (edit_request, editable) {
            if let Some(current) = rows.get(row) {
                let text = match column {
                    EditColumn::Frame => current.frame.to_string(),
                    EditColumn::Note => current.note.clone(),
                };
                self.begin_edit(row, column, text);
            }
        }
        None
    }

    fn editing_cell(&mut self, row: usize, column: EditColumn) -> Option<&mut CellEdit> {
        self.editing
            .as_mut()
            .filter(|edit| edit.row == row && edit.column == column)
    }
}

enum EditOutcome {
    Commit(usize, EditColumn, String),
    Cancel,
}

fn edit_cell(ui: &mut egui::Ui, edit: &mut CellEdit) -> Option<EditOutcome> {
    let response = ui.add(egui::TextEdit::singleline(&mut edit.text).desired_width(f32::INFINITY));
    if !edit.focused {
        response.request_focus();
        edit.focused = true;
        return None;
    }
    if response.lost_focus() {
        if ui.input(|i| i.key_pressed(Key::Escape)) {
            return Some(EditOutcome::Cancel);
        }
        return Some(EditOutcome::Commit(edit.row, edit.column, edit.text.clone()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_selects_and_modifier_toggles() {
        let mut table = TimingTable::new();
        table.select(2, false);
        table.select(4, true);
        assert_eq!(table.selected_rows(), vec![2, 4]);

        table.select(2, true);
        assert_eq!(table.selected_rows(), vec![4]);

        table.select(1, false);
        assert_eq!(table.selected_rows(), vec![1]);

        table.reset();
        assert!(!table.has_selection());
    }
}
