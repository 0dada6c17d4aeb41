//! One open timing and everything the view layer needs to drive it.
//!
//! A view translates its events (button presses, shortcuts, timer
//! callbacks, menu actions) into calls on [`TimingSession`] and renders the
//! results. The session owns the clock, the document, the preferences and the
//! recent file list; it never reaches into a UI.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::core::clock::{AutoStop, Clock, DisplaySink, Tick};
use crate::core::frame;
use crate::error::TimingError;
use crate::model::{LoadReport, TimingDocument, TimingRow};
use crate::settings::{Preferences, RecentTimings, SettingsStore};

/// Mirrors captures somewhere else, e.g. as keys on a host application timeline.
pub trait TimelineSink {
    fn on_row_added(&mut self, frame: u64);

    fn on_rows_cleared(&mut self) {}
}

pub struct TimingSession {
    clock: Clock,
    document: TimingDocument,
    file_path: Option<PathBuf>,
    preferences: Preferences,
    recent: RecentTimings,
    settings: Box<dyn SettingsStore>,
    timeline: Option<Box<dyn TimelineSink>>,
    project_directory: Option<PathBuf>,
}

impl TimingSession {
    pub fn new(settings: Box<dyn SettingsStore>) -> Self {
        Self::with_clock(settings, Clock::new())
    }

    pub fn with_clock(settings: Box<dyn SettingsStore>, clock: Clock) -> Self {
        let preferences = Preferences::load(settings.as_ref());
        let recent = RecentTimings::load(settings.as_ref(), preferences.max_recent_timing);

        let mut document = TimingDocument::new();
        if let Err(e) = document.set_fps(preferences.default_fps) {
            warn!("Default fps rejected, keeping {}: {}", document.fps(), e);
        }

        Self {
            clock,
            document,
            file_path: None,
            preferences,
            recent,
            settings,
            timeline: None,
            project_directory: None,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn document(&self) -> &TimingDocument {
        &self.document
    }

    pub fn rows(&self) -> &[TimingRow] {
        self.document.rows()
    }

    pub fn fps(&self) -> u32 {
        self.document.fps()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn on_dirty_changed(&mut self, observer: impl FnMut(bool) + 'static) {
        self.document.on_dirty_changed(observer);
    }

    pub fn set_timeline_sink(&mut self, sink: Option<Box<dyn TimelineSink>>) {
        self.timeline = sink;
    }

    /// File name, or `Untitled`, with a trailing `*` when there are unsaved changes.
    pub fn title(&self) -> String {
        let name = self
            .file_path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string());
        if self.is_dirty() {
            format!("{}*", name)
        } else {
            name
        }
    }

    // --- Clock ---

    /// Starts a new take when idle, captures a row when running.
    ///
    /// Returns the captured row, or `None` when this call started the clock.
    pub fn start_or_capture(&mut self, note: &str) -> Result<Option<TimingRow>, TimingError> {
        if self.clock.is_running() {
            return self.capture(note);
        }

        self.document.clear();
        if let Some(timeline) = self.timeline.as_mut() {
            timeline.on_rows_cleared();
        }
        self.clock.start();
        Ok(None)
    }

    /// Captures the current time and frame. Does nothing while the clock is idle.
    pub fn capture(&mut self, note: &str) -> Result<Option<TimingRow>, TimingError> {
        if !self.clock.is_running() {
            return Ok(None);
        }

        let elapsed_ms = self.clock.elapsed();
        let frame = frame::frames_for(elapsed_ms as i64, self.fps())?;
        let row = self.document.capture(elapsed_ms, frame, note)?;
        if let Some(timeline) = self.timeline.as_mut() {
            timeline.on_row_added(frame);
        }
        Ok(Some(row))
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Stops the clock, goes back to the offset and empties the table.
    pub fn reset(&mut self) {
        self.clock.stop();
        self.clock.reset();
        self.document.clear();
        if let Some(timeline) = self.timeline.as_mut() {
            timeline.on_rows_cleared();
        }
    }

    pub fn tick(&mut self, sink: &mut dyn DisplaySink) -> Result<Tick, TimingError> {
        let fps = self.fps();
        self.clock.tick(fps, sink)
    }

    /// How often [`TimingSession::tick`] should run at the current fps.
    pub fn tick_interval_ms(&self) -> Result<u64, TimingError> {
        frame::tick_interval_ms(self.fps())
    }

    /// Current elapsed time as `mm:ss:zzz`.
    pub fn time_text(&self) -> String {
        frame::format_time(self.clock.elapsed() as i64).unwrap_or_else(|_| "59:59:999".to_string())
    }

    pub fn current_frame(&self) -> u64 {
        self.clock.frame(self.fps()).unwrap_or(0)
    }

    pub fn focus_lost(&mut self) {
        if self.preferences.stop_timer_on_focus_out && self.clock.is_running() {
            self.clock.stop();
        }
    }

    pub fn auto_stop(&self) -> AutoStop {
        self.clock.auto_stop()
    }

    pub fn set_auto_stop(&mut self, auto_stop: AutoStop) {
        self.clock.set_auto_stop(auto_stop);
    }

    // --- Options ---

    pub fn set_fps(&mut self, fps: u32) -> Result<(), TimingError> {
        frame::validate_fps(fps)?;
        self.document.set_fps(fps)?;
        self.sync_offset()
    }

    pub fn set_offsets(&mut self, time_ms: u64, frame: u64) -> Result<(), TimingError> {
        let previous = (self.document.offset_time_ms(), self.document.offset_frame());
        self.document.set_offsets(time_ms, frame)?;
        if let Err(e) = self.sync_offset() {
            self.document.set_offsets(previous.0, previous.1)?;
            return Err(e);
        }
        Ok(())
    }

    pub fn reset_offsets(&mut self) -> Result<(), TimingError> {
        self.set_offsets(0, 0)
    }

    pub fn has_offsets(&self) -> bool {
        self.clock.offset_ms() > 0
    }

    fn sync_offset(&mut self) -> Result<(), TimingError> {
        let offset = self.document.total_offset_ms()?;
        let offset = i64::try_from(offset).map_err(|_| {
            TimingError::InvalidArgument(format!("offset of {} ms is out of range", offset))
        })?;
        self.clock.set_offset(offset)
    }

    // --- Rows ---

    pub fn edit_frame(&mut self, row: usize, input: &str) -> Result<u64, TimingError> {
        self.document.edit_frame(row, input)
    }

    pub fn edit_note(&mut self, row: usize, note: &str) -> Result<(), TimingError> {
        self.document.edit_note(row, note)
    }

    pub fn remove_rows(&mut self, rows: &[usize]) -> usize {
        self.document.remove(rows)
    }

    // --- Files ---

    /// Forgets the current file and starts an empty timing at the default fps.
    pub fn new_timing(&mut self) -> Result<(), TimingError> {
        self.reset();
        self.document.set_offsets(0, 0)?;
        self.document.set_fps(self.preferences.default_fps)?;
        self.sync_offset()?;
        self.clock.reset();
        self.document.mark_saved();
        self.file_path = None;
        Ok(())
    }

    /// Loads `path` in place of the current timing.
    ///
    /// On failure the current timing is kept. A file from a newer version also
    /// switches off auto loading so it is not retried on the next launch.
    pub fn open(&mut self, path: &Path) -> Result<LoadReport, TimingError> {
        let report = match self.document.load(path, self.preferences.default_fps) {
            Ok(report) => report,
            Err(e) => {
                if matches!(e, TimingError::IncompatibleVersion { .. })
                    && self.preferences.auto_load_last_timing
                {
                    warn!("Disabling auto load of the last timing after: {}", e);
                    self.preferences.auto_load_last_timing = false;
                    self.store_preferences();
                }
                return Err(e);
            }
        };

        self.clock.stop();
        self.file_path = Some(path.to_path_buf());
        if let Err(e) = self.sync_offset() {
            warn!("Offsets from {} ignored: {}", path.display(), e);
            self.document.set_offsets(0, 0)?;
            self.sync_offset()?;
        }
        self.clock.reset();
        self.remember(path);

        if let Some(timeline) = self.timeline.as_mut() {
            timeline.on_rows_cleared();
            for row in self.document.rows() {
                timeline.on_row_added(row.frame);
            }
        }

        Ok(report)
    }

    /// Saves to the current file.
    ///
    /// An untitled timing has nowhere to go yet: `NothingToSave` when it is
    /// also unchanged, `NoFilePath` otherwise.
    pub fn save(&mut self) -> Result<(), TimingError> {
        match self.file_path.clone() {
            Some(path) => self.write_to(&path),
            None if !self.is_dirty() => Err(TimingError::NothingToSave),
            None => Err(TimingError::NoFilePath),
        }
    }

    pub fn save_as(&mut self, path: &Path) -> Result<(), TimingError> {
        if self.file_path.is_none() && !self.is_dirty() {
            return Err(TimingError::NothingToSave);
        }
        self.write_to(path)
    }

    fn write_to(&mut self, path: &Path) -> Result<(), TimingError> {
        self.clock.stop();
        self.document.save(path)?;
        self.file_path = Some(path.to_path_buf());
        self.remember(path);
        Ok(())
    }

    /// Drops unsaved changes: reloads the file, or starts over when untitled.
    pub fn discard_changes(&mut self) -> Result<(), TimingError> {
        if !self.is_dirty() {
            return Ok(());
        }
        match self.file_path.clone() {
            Some(path) => self.open(&path).map(|_| ()),
            None => self.new_timing(),
        }
    }

    /// Opens the most recent timing when the preference asks for it.
    pub fn auto_load(&mut self) -> Result<Option<LoadReport>, TimingError> {
        if !self.preferences.auto_load_last_timing {
            return Ok(None);
        }
        let Some(path) = self.recent.last().map(Path::to_path_buf) else {
            return Ok(None);
        };
        info!("Auto loading {}", path.display());
        self.open(&path).map(Some)
    }

    // --- Preferences and recent files ---

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
        self.recent.set_max(self.preferences.max_recent_timing);
        self.store_preferences();
        self.store_recent();
    }

    pub fn recent_timings(&self) -> &[PathBuf] {
        self.recent.entries()
    }

    pub fn remove_recent(&mut self, path: &Path) {
        if self.recent.remove(path) {
            self.store_recent();
        }
    }

    pub fn clear_recent_timings(&mut self) {
        self.recent.clear();
        self.store_recent();
    }

    pub fn set_project_directory(&mut self, directory: Option<PathBuf>) {
        self.project_directory = directory;
    }

    /// Where file dialogs should open.
    pub fn default_save_directory(&self) -> Option<PathBuf> {
        if self.preferences.project_save_in_dirs {
            if let Some(project) = self.project_directory.as_ref() {
                return Some(project.clone());
            }
        }
        self.preferences.default_directory.clone()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn settings_mut(&mut self) -> &mut dyn SettingsStore {
        self.settings.as_mut()
    }

    pub fn flush_settings(&mut self) {
        if let Err(e) = self.settings.flush() {
            warn!("Failed to write settings: {}", e);
        }
    }

    fn remember(&mut self, path: &Path) {
        self.recent.add(path);
        self.store_recent();
    }

    fn store_recent(&mut self) {
        self.recent.save(self.settings.as_mut());
        self.flush_settings();
    }

    fn store_preferences(&mut self) {
        self.preferences.store(self.settings.as_mut());
        self.flush_settings();
    }
}
