use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use eframe::egui::{self, Button, RichText};
use log::{error, info, warn};
use timing_core::core::clock::{DisplaySink, Tick};
use timing_core::model::LoadReport;
use timing_core::{TimingError, TimingSession};

use crate::command::{CommandId, CommandRegistry};
use crate::config::{TomlSettings, WindowSettings};
use crate::shortcut::ShortcutManager;
use crate::ui::dialogs::about_dialog::AboutDialog;
use crate::ui::dialogs::auto_stop_dialog::AutoStopDialog;
use crate::ui::dialogs::confirmation::{ConfirmationAction, ConfirmationDialog};
use crate::ui::dialogs::options_dialog::{OptionsDialog, TimingOptions};
use crate::ui::dialogs::preferences_dialog::PreferencesDialog;
use crate::ui::dialogs::DialogResult;
use crate::ui::menu::{self, MenuAction, MenuState};
use crate::ui::table::{TableEdit, TimingTable};

const TIMING_EXTENSIONS: [&str; 1] = ["timing"];
const JSON_EXTENSIONS: [&str; 1] = ["json"];

/// Timer and frame labels, refreshed by every clock tick.
struct TimerLabels {
    time: String,
    frame: u64,
}

impl DisplaySink for TimerLabels {
    fn update_timer_display(&mut self, text: &str) {
        self.time.clear();
        self.time.push_str(text);
    }

    fn update_frame_display(&mut self, frame: u64) {
        self.frame = frame;
    }
}

pub struct TimerApp {
    session: TimingSession,
    labels: TimerLabels,
    table: TimingTable,
    window: WindowSettings,
    shortcut_manager: ShortcutManager,
    command_registry: CommandRegistry,
    confirmation: ConfirmationDialog,
    options_dialog: OptionsDialog,
    auto_stop_dialog: AutoStopDialog,
    preferences_dialog: PreferencesDialog,
    about_dialog: AboutDialog,
    status: Option<String>,
    title_stale: Rc<Cell<bool>>,
    allow_close: bool,
    was_focused: Option<bool>,
}

impl TimerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: TomlSettings,
        window: WindowSettings,
        project_directory: Option<PathBuf>,
    ) -> Self {
        let mut session = TimingSession::new(Box::new(settings));
        session.set_project_directory(project_directory);

        let title_stale = Rc::new(Cell::new(true));
        let flag = Rc::clone(&title_stale);
        session.on_dirty_changed(move |_| flag.set(true));

        let mut app = Self {
            labels: TimerLabels {
                time: session.time_text(),
                frame: session.current_frame(),
            },
            session,
            table: TimingTable::new(),
            window,
            shortcut_manager: ShortcutManager::new(),
            command_registry: CommandRegistry::new(),
            confirmation: ConfirmationDialog::new(),
            options_dialog: OptionsDialog::new(),
            auto_stop_dialog: AutoStopDialog::new(),
            preferences_dialog: PreferencesDialog::new(),
            about_dialog: AboutDialog::default(),
            status: None,
            title_stale,
            allow_close: false,
            was_focused: None,
        };

        match app.session.auto_load() {
            Ok(Some(report)) => app.loaded(report),
            Ok(None) => {}
            Err(e) => app.report_error("Could not open the last timing", &e),
        }
        cc.egui_ctx.request_repaint();
        app
    }

    fn refresh_labels(&mut self) {
        self.labels.time = self.session.time_text();
        self.labels.frame = self.session.current_frame();
    }

    fn report_error(&mut self, context: &str, e: &TimingError) {
        error!("{}: {}", context, e);
        self.status = Some(format!("{}: {}", context, e));
    }

    fn loaded(&mut self, report: LoadReport) {
        self.table.reset();
        self.refresh_labels();
        self.title_stale.set(true);
        self.status = if report.is_clean() {
            Some("Timing loaded".to_string())
        } else {
            let warnings: Vec<String> = report.warnings.iter().map(|w| w.to_string()).collect();
            Some(format!("Loaded with warnings: {}", warnings.join("; ")))
        };
    }

    fn file_dialog(&self) -> rfd::FileDialog {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("Timing", &TIMING_EXTENSIONS)
            .add_filter("JSON", &JSON_EXTENSIONS);
        if let Some(dir) = self.session.default_save_directory() {
            dialog = dialog.set_directory(dir);
        }
        dialog
    }

    // --- File actions ---

    fn new_timing(&mut self) {
        if let Err(e) = self.session.new_timing() {
            self.report_error("Could not start a new timing", &e);
        }
        self.table.reset();
        self.refresh_labels();
        self.title_stale.set(true);
        self.status = None;
    }

    fn open_path(&mut self, path: &Path) {
        match self.session.open(path) {
            Ok(report) => self.loaded(report),
            Err(e @ TimingError::FileNotFound(_)) => {
                self.session.remove_recent(path);
                self.report_error("Could not open timing", &e);
            }
            Err(e) => self.report_error("Could not open timing", &e),
        }
    }

    fn request_open(&mut self, path: PathBuf) {
        if self.session.is_dirty() {
            self.confirmation.open(ConfirmationAction::Open(path));
        } else {
            self.open_path(&path);
        }
    }

    fn save(&mut self) {
        match self.session.save() {
            Ok(()) => self.saved(),
            Err(TimingError::NoFilePath) => self.save_as(),
            Err(e) => self.report_error("Could not save", &e),
        }
    }

    fn save_as(&mut self) {
        let Some(path) = self.file_dialog().set_file_name("untitled.timing").save_file() else {
            return;
        };
        match self.session.save_as(&path) {
            Ok(()) => self.saved(),
            Err(e) => self.report_error("Could not save", &e),
        }
    }

    fn saved(&mut self) {
        self.refresh_labels();
        self.title_stale.set(true);
        if let Some(path) = self.session.file_path() {
            self.status = Some(format!("Saved to {}", path.display()));
        }
    }

    fn discard_changes(&mut self) {
        if let Err(e) = self.session.discard_changes() {
            self.report_error("Could not discard changes", &e);
        }
        self.table.reset();
        self.refresh_labels();
        self.title_stale.set(true);
    }

    // --- Window ---

    fn store_window_settings(&mut self, ctx: &egui::Context) {
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.window.width = rect.width();
            self.window.height = rect.height();
        }
        self.window.store(self.session.settings_mut());
        self.session.flush_settings();
    }

    fn apply_window_level(&self, ctx: &egui::Context) {
        let level = if self.window.always_on_top {
            egui::viewport::WindowLevel::AlwaysOnTop
        } else {
            egui::viewport::WindowLevel::Normal
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(level));
    }

    fn execute(&mut self, ctx: &egui::Context, action: MenuAction) {
        match action {
            MenuAction::OpenRecent(path) => self.request_open(path),
            MenuAction::ClearRecent => self.session.clear_recent_timings(),
            MenuAction::Command(id) => self.execute_command(ctx, id),
        }
    }

    fn execute_command(&mut self, ctx: &egui::Context, id: CommandId) {
        match id {
            CommandId::StartOrCapture => {
                let was_running = self.session.is_running();
                match self.session.start_or_capture("") {
                    Ok(_) if !was_running => {
                        self.table.reset();
                        self.status = None;
                    }
                    Ok(_) => {}
                    Err(e) => self.report_error("Could not capture", &e),
                }
                self.refresh_labels();
            }
            CommandId::Stop => {
                self.session.stop();
                self.refresh_labels();
            }
            CommandId::Reset => {
                if self.table.has_selection() {
                    self.execute_command(ctx, CommandId::DeleteSelectedRows);
                } else {
                    self.session.reset();
                    self.table.reset();
                    self.refresh_labels();
                }
            }
            CommandId::DeleteSelectedRows => {
                let removed = self.session.remove_rows(&self.table.selected_rows());
                self.table.reset();
                if removed > 0 {
                    info!("Removed {} row(s)", removed);
                }
            }
            CommandId::NewTiming => {
                if self.session.is_dirty() {
                    self.confirmation.open(ConfirmationAction::NewTiming);
                } else {
                    self.new_timing();
                }
            }
            CommandId::OpenTiming => {
                if let Some(path) = self.file_dialog().pick_file() {
                    self.request_open(path);
                }
            }
            CommandId::Save => self.save(),
            CommandId::SaveAs => self.save_as(),
            CommandId::DiscardChanges => {
                if self.session.is_dirty() {
                    self.confirmation.open(ConfirmationAction::DiscardChanges);
                }
            }
            CommandId::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            CommandId::ResetOffsets => {
                if let Err(e) = self.session.reset_offsets() {
                    self.report_error("Could not reset offsets", &e);
                }
                self.refresh_labels();
            }
            CommandId::Preferences => self.preferences_dialog.open(self.session.preferences()),
            CommandId::Options => {
                let document = self.session.document();
                self.options_dialog.open(TimingOptions {
                    fps: document.fps(),
                    offset_time_ms: document.offset_time_ms(),
                    offset_frame: document.offset_frame(),
                });
            }
            CommandId::AutoStop => self.auto_stop_dialog.open(self.session.auto_stop()),
            CommandId::ResetWindowSize => {
                let defaults = WindowSettings::default();
                self.window.width = defaults.width;
                self.window.height = defaults.height;
                ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                    defaults.width,
                    defaults.height,
                )));
            }
            CommandId::About => self.about_dialog.is_open = true,
        }
    }

    fn apply_options(&mut self, options: TimingOptions) {
        if let Err(e) = self.session.set_fps(options.fps) {
            self.report_error("Frame rate not applied", &e);
            return;
        }
        if let Err(e) = self
            .session
            .set_offsets(options.offset_time_ms, options.offset_frame)
        {
            self.report_error("Offsets not applied", &e);
        }
        self.refresh_labels();
    }

    fn apply_edit(&mut self, edit: TableEdit) {
        match edit {
            TableEdit::Frame { row, text } => match self.session.edit_frame(row, &text) {
                Ok(frame) if text.trim().parse::<u64>().ok() != Some(frame) => {
                    self.status = Some(format!("Frame kept between its neighbours: {}", frame));
                }
                Ok(_) => {}
                Err(e) => self.report_error("Frame not changed", &e),
            },
            TableEdit::Note { row, text } => {
                if let Err(e) = self.session.edit_note(row, &text) {
                    self.report_error("Note not changed", &e);
                }
            }
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(action) = self.confirmation.show(ctx) {
            match action {
                ConfirmationAction::NewTiming => self.new_timing(),
                ConfirmationAction::Open(path) => self.open_path(&path),
                ConfirmationAction::DiscardChanges => self.discard_changes(),
                ConfirmationAction::Quit => {
                    self.allow_close = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
        }

        if let Some(DialogResult::Accepted(options)) = self.options_dialog.show(ctx) {
            self.apply_options(options);
        }

        if let Some(DialogResult::Accepted(auto_stop)) = self.auto_stop_dialog.show(ctx) {
            info!("{}", auto_stop);
            self.session.set_auto_stop(auto_stop);
        }

        if let Some(DialogResult::Accepted(preferences)) = self.preferences_dialog.show(ctx) {
            self.session.set_preferences(preferences);
        }

        self.about_dialog.show(ctx);
    }

    fn timer_panel(&mut self, ui: &mut egui::Ui, triggered_action: &mut Option<MenuAction>) {
        let running = self.session.is_running();

        ui.horizontal(|ui| {
            ui.label(RichText::new(self.session.title()).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{} fps", self.session.fps()));
            });
        });

        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&self.labels.time).monospace().size(36.0));
            ui.label(RichText::new(format!("Frame {}", self.labels.frame)).size(18.0));
        });

        ui.add_space(4.0);
        ui.columns(3, |columns| {
            for (column, (id, text, enabled)) in columns.iter_mut().zip(timer_buttons(running)) {
                let shortcut = self
                    .command_registry
                    .find(id)
                    .map(|cmd| cmd.shortcut_text)
                    .unwrap_or_default();
                let button = Button::new(text).min_size(egui::vec2(column.available_width(), 28.0));
                if column
                    .add_enabled(enabled, button)
                    .on_hover_text(shortcut)
                    .clicked()
                {
                    *triggered_action = Some(MenuAction::Command(id));
                }
            }
        });

        ui.horizontal(|ui| {
            if ui.add_enabled(!running, Button::new("Options...")).clicked() {
                *triggered_action = Some(MenuAction::Command(CommandId::Options));
            }
            if ui.button(self.session.auto_stop().to_string()).clicked() {
                *triggered_action = Some(MenuAction::Command(CommandId::AutoStop));
            }
            if self.session.has_offsets() {
                let document = self.session.document();
                ui.weak(format!(
                    "offset {} ms + {} f",
                    document.offset_time_ms(),
                    document.offset_frame()
                ));
            }
        });
    }
}

impl eframe::App for TimerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut triggered_action: Option<MenuAction> = None;

        // 1. Shortcuts, unless a dialog is up
        let dialog_open = self.confirmation.is_open
            || self.options_dialog.is_open
            || self.auto_stop_dialog.is_open
            || self.preferences_dialog.is_open;
        if !dialog_open {
            if let Some(id) = self.shortcut_manager.handle_shortcuts(ctx, &self.command_registry) {
                triggered_action = Some(MenuAction::Command(id));
            }
        }

        // 2. Clock
        if self.session.is_running() {
            match self.session.tick(&mut self.labels) {
                Ok(Tick::Stopped { elapsed_ms, frame }) => {
                    info!("Clock stopped at {} ms, frame {}", elapsed_ms, frame);
                    self.refresh_labels();
                }
                Ok(_) => {}
                Err(e) => self.report_error("Clock error", &e),
            }
            match self.session.tick_interval_ms() {
                Ok(interval) => ctx.request_repaint_after(Duration::from_millis(interval)),
                Err(e) => warn!("No tick interval: {}", e),
            }
        }

        // 3. Focus
        let focused = ctx.input(|i| i.viewport().focused);
        if self.was_focused == Some(true) && focused == Some(false) {
            self.session.focus_lost();
            self.refresh_labels();
        }
        self.was_focused = focused;

        // 4. Menu bar
        let always_on_top = self.window.always_on_top;
        let view_before = (self.window.show_interval, self.window.show_note);
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            let state = MenuState {
                recent: self.session.recent_timings(),
                has_selection: self.table.has_selection(),
                has_offsets: self.session.has_offsets(),
                is_dirty: self.session.is_dirty(),
            };
            menu::menu_bar(
                ui,
                &self.command_registry,
                &state,
                &mut self.window,
                &mut triggered_action,
            );
        });
        if self.window.always_on_top != always_on_top {
            self.apply_window_level(ctx);
        }
        if self.window.always_on_top != always_on_top
            || (self.window.show_interval, self.window.show_note) != view_before
        {
            self.store_window_settings(ctx);
        }

        // 5. Timer, status and table
        egui::TopBottomPanel::top("timer_panel").show(ctx, |ui| {
            self.timer_panel(ui, &mut triggered_action);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let text = self.status.clone().unwrap_or_else(|| {
                format!("{} rows", self.session.rows().len())
            });
            ui.small(text);
        });

        let mut table_edit = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let editable = !self.session.is_running();
            table_edit = self
                .table
                .show(ui, self.session.rows(), &self.window, editable);
        });
        if let Some(edit) = table_edit {
            self.apply_edit(edit);
        }

        // --- Deferred Action Execution ---
        if let Some(action) = triggered_action {
            self.execute(ctx, action);
        }

        self.show_dialogs(ctx);

        // Unsaved changes guard on window close
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.session.is_dirty() && !self.allow_close {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.confirmation.open(ConfirmationAction::Quit);
            } else {
                self.store_window_settings(ctx);
            }
        }

        if self.title_stale.replace(false) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
                "{} - Animation Timer",
                self.session.title()
            )));
        }
    }
}

/// Start/Capture, Stop and Reset with their enabled state. Reset stays
/// available mid-take, like the Delete key.
fn timer_buttons(running: bool) -> [(CommandId, &'static str, bool); 3] {
    let start_text = if running { "Capture" } else { "Start" };
    [
        (CommandId::StartOrCapture, start_text, true),
        (CommandId::Stop, "Stop", running),
        (CommandId::Reset, "Reset", true),
    ]
}
