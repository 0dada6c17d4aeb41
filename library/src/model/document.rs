use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use super::row::{TimingRow, recompute_intervals};
use crate::core::frame::{self, DEFAULT_FPS, MAX_ELAPSED_MS};
use crate::error::TimingError;

pub const PLUGIN_NAME: &str = "Animation Timer";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    pub plugin_name: String,
    pub plugin_version: String,
    /// `MM/DD/YYYY HH:MM:SS` stamp of the last save.
    pub created_at: Option<String>,
}

impl Default for DocumentHeader {
    fn default() -> Self {
        Self {
            plugin_name: PLUGIN_NAME.to_string(),
            plugin_version: PLUGIN_VERSION.to_string(),
            created_at: None,
        }
    }
}

type DirtyObserver = Box<dyn FnMut(bool)>;

/// The rows of one capture session plus the fps and offsets they were
/// captured with.
///
/// The document tracks whether its rows differ from the last saved or loaded
/// snapshot and tells registered observers whenever that flag flips.
pub struct TimingDocument {
    pub(crate) header: DocumentHeader,
    pub(crate) fps: u32,
    pub(crate) offset_time_ms: u64,
    pub(crate) offset_frame: u64,
    pub(crate) rows: Vec<TimingRow>,
    saved_rows: Vec<TimingRow>,
    dirty: bool,
    observers: Vec<DirtyObserver>,
}

impl fmt::Debug for TimingDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimingDocument")
            .field("header", &self.header)
            .field("fps", &self.fps)
            .field("offset_time_ms", &self.offset_time_ms)
            .field("offset_frame", &self.offset_frame)
            .field("rows", &self.rows)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Default for TimingDocument {
    fn default() -> Self {
        Self {
            header: DocumentHeader::default(),
            fps: DEFAULT_FPS,
            offset_time_ms: 0,
            offset_frame: 0,
            rows: Vec::new(),
            saved_rows: Vec::new(),
            dirty: false,
            observers: Vec::new(),
        }
    }
}

impl TimingDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fps(fps: u32) -> Result<Self, TimingError> {
        let mut document = Self::default();
        document.set_fps(fps)?;
        Ok(document)
    }

    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn offset_time_ms(&self) -> u64 {
        self.offset_time_ms
    }

    pub fn offset_frame(&self) -> u64 {
        self.offset_frame
    }

    pub fn rows(&self) -> &[TimingRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&TimingRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Registers a callback fired with the new value whenever the dirty flag flips.
    pub fn on_dirty_changed(&mut self, observer: impl FnMut(bool) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Appends a row for the given time and frame.
    pub fn capture(
        &mut self,
        time_ms: u64,
        frame: u64,
        note: impl Into<String>,
    ) -> Result<TimingRow, TimingError> {
        if time_ms > MAX_ELAPSED_MS {
            return Err(TimingError::InvalidArgument(format!(
                "cannot capture {} ms, past 59:59:999",
                time_ms
            )));
        }

        let mut row = TimingRow::new(time_ms, frame, note);
        row.interval = self.rows.last().map(|prev| frame as i64 - prev.frame as i64);
        self.rows.push(row.clone());
        self.refresh_dirty();
        Ok(row)
    }

    /// Replaces a row's frame with user input.
    ///
    /// The new frame is kept strictly between the neighbouring rows' frames,
    /// and the row time is recomputed from it. Returns the frame actually stored.
    pub fn edit_frame(&mut self, index: usize, input: &str) -> Result<u64, TimingError> {
        let requested: i64 = input
            .trim()
            .parse()
            .map_err(|_| TimingError::InvalidFrameEdit(input.to_string()))?;
        if requested < 0 {
            return Err(TimingError::InvalidFrameEdit(input.to_string()));
        }
        self.check_index(index)?;

        let mut frame = requested;
        if index > 0 {
            let previous = self.rows[index - 1].frame as i64;
            if frame <= previous {
                frame = previous + 1;
            }
        }
        if let Some(next) = self.rows.get(index + 1) {
            let next = next.frame as i64;
            if frame >= next {
                frame = next - 1;
            }
        }
        let frame = frame.max(0);
        if frame != requested {
            warn!(
                "Frame {} on row {} clamped to {} to keep rows in order",
                requested,
                index + 1,
                frame
            );
        }

        let time_ms = frame::time_ms_for(frame, self.fps)
            .ok()
            .filter(|ms| *ms <= MAX_ELAPSED_MS)
            .ok_or_else(|| TimingError::InvalidFrameEdit(input.to_string()))?;

        let row = &mut self.rows[index];
        row.frame = frame as u64;
        row.time_ms = time_ms;
        recompute_intervals(&mut self.rows);
        self.refresh_dirty();
        Ok(frame as u64)
    }

    pub fn edit_note(&mut self, index: usize, note: impl Into<String>) -> Result<(), TimingError> {
        self.check_index(index)?;
        self.rows[index].note = note.into();
        self.refresh_dirty();
        Ok(())
    }

    /// Deletes the given rows. Unknown indices are ignored. Returns how many went.
    pub fn remove(&mut self, indices: &[usize]) -> usize {
        let doomed: BTreeSet<usize> = indices.iter().copied().collect();
        let before = self.rows.len();
        let mut index = 0;
        self.rows.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
        let removed = before - self.rows.len();
        if removed > 0 {
            recompute_intervals(&mut self.rows);
            self.refresh_dirty();
        }
        removed
    }

    /// Drops every row and resets the header.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.header = DocumentHeader::default();
        self.refresh_dirty();
    }

    pub fn set_fps(&mut self, fps: u32) -> Result<(), TimingError> {
        frame::tick_interval_ms(fps)?;
        self.fps = fps;
        Ok(())
    }

    pub fn set_offsets(&mut self, time_ms: u64, frame: u64) -> Result<(), TimingError> {
        if time_ms > MAX_ELAPSED_MS {
            return Err(TimingError::InvalidArgument(format!(
                "offset of {} ms does not fit in mm:ss:zzz",
                time_ms
            )));
        }
        self.offset_time_ms = time_ms;
        self.offset_frame = frame;
        Ok(())
    }

    /// Offset time plus the time of the offset frame.
    pub fn total_offset_ms(&self) -> Result<u64, TimingError> {
        let frame = i64::try_from(self.offset_frame).map_err(|_| {
            TimingError::InvalidArgument(format!("offset frame {} is out of range", self.offset_frame))
        })?;
        let frame_ms = frame::time_ms_for(frame, self.fps)?;
        self.offset_time_ms.checked_add(frame_ms).ok_or_else(|| {
            TimingError::InvalidArgument(format!(
                "offset of {} ms plus frame {} is out of range",
                self.offset_time_ms, self.offset_frame
            ))
        })
    }

    /// Makes the current rows the clean baseline.
    pub fn mark_saved(&mut self) {
        self.saved_rows = self.rows.clone();
        self.refresh_dirty();
    }

    pub(crate) fn replace(&mut self, other: TimingDocument) {
        self.header = other.header;
        self.fps = other.fps;
        self.offset_time_ms = other.offset_time_ms;
        self.offset_frame = other.offset_frame;
        self.rows = other.rows;
        self.mark_saved();
    }

    fn check_index(&self, index: usize) -> Result<(), TimingError> {
        if index >= self.rows.len() {
            return Err(TimingError::InvalidArgument(format!(
                "row {} does not exist ({} rows)",
                index,
                self.rows.len()
            )));
        }
        Ok(())
    }

    fn refresh_dirty(&mut self) {
        let dirty = self.rows != self.saved_rows;
        if dirty != self.dirty {
            self.dirty = dirty;
            for observer in self.observers.iter_mut() {
                observer(dirty);
            }
        }
    }
}
