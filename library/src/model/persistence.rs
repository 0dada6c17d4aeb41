//! The on-disk `.timing` format.
//!
//! ```json
//! {
//!     "infos": {
//!         "plugin_name": "Animation Timer",
//!         "plugin_version": "1.4.1",
//!         "fps": 24,
//!         "offset_time": 0,
//!         "offset_frame": 0,
//!         "date": "10/19/2026 14:03:12"
//!     },
//!     "data": [
//!         {"time": "00:00:500", "frame": "12", "interval": "-", "note": ""}
//!     ]
//! }
//! ```
//!
//! Row numbers are written as strings. On read, numbers and numeric strings
//! are both accepted; intervals are always recomputed from the frames.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::document::{DocumentHeader, PLUGIN_NAME, PLUGIN_VERSION, TimingDocument};
use super::row::{TimingRow, recompute_intervals};
use super::version::PluginVersion;
use crate::core::frame::{self, MAX_ELAPSED_MS};
use crate::error::TimingError;

const DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";
const NO_INTERVAL: &str = "-";

/// A number that older files may have written as a string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(i64),
    Text(String),
}

impl NumberOrText {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumberOrText::Number(n) => Some(*n),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for NumberOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberOrText::Number(n) => write!(f, "{}", n),
            NumberOrText::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct TimingInfos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<NumberOrText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_time: Option<NumberOrText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_frame: Option<NumberOrText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RowRecord {
    #[serde(default)]
    pub time: String,
    pub frame: NumberOrText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<NumberOrText>,
    #[serde(default)]
    pub note: String,
}

/// The persisted shape of a [`TimingDocument`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimingFile {
    #[serde(default)]
    pub infos: Option<TimingInfos>,
    #[serde(default)]
    pub data: Vec<RowRecord>,
}

/// Something odd about a loaded file that did not stop the load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    MissingPluginName,
    PluginNameMismatch(String),
    MissingVersion,
    UnreadableVersion(String),
    OlderVersion(String),
    /// A header field was absent or unreadable; a default was used.
    MissingHeaderField(&'static str),
    /// A header field held a value that cannot be used; it was reset to 0.
    HeaderFieldOutOfRange(&'static str, u64),
    FpsOutOfRange(u32),
    /// Row number (1-based) whose frame is lower than the row before it.
    FramesOutOfOrder(usize),
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MissingPluginName => {
                write!(f, "The plugin name could not be found in the save file")
            }
            LoadWarning::PluginNameMismatch(name) => write!(
                f,
                "The save file was written by '{}'; are you sure it is meant for {}?",
                name, PLUGIN_NAME
            ),
            LoadWarning::MissingVersion => write!(
                f,
                "The version of this save file could not be found. Use it with caution"
            ),
            LoadWarning::UnreadableVersion(version) => write!(
                f,
                "The version '{}' of this save file could not be read. Use it with caution",
                version
            ),
            LoadWarning::OlderVersion(version) => write!(
                f,
                "The save file comes from an older version ({}) than this one ({})",
                version, PLUGIN_VERSION
            ),
            LoadWarning::MissingHeaderField(field) => write!(
                f,
                "'{}' could not be found or is corrupted; the default value is used",
                field
            ),
            LoadWarning::HeaderFieldOutOfRange(field, value) => write!(
                f,
                "'{}' value {} is out of range; the default value is used",
                field, value
            ),
            LoadWarning::FramesOutOfOrder(row) => write!(
                f,
                "Row {} has a lower frame than the row before it",
                row
            ),
            LoadWarning::FpsOutOfRange(fps) => write!(
                f,
                "The frame rate {} is outside the usual {}-{} range",
                fps,
                frame::MIN_FPS,
                frame::MAX_FPS
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub warnings: Vec<LoadWarning>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

fn check_version(found: Option<&str>, warnings: &mut Vec<LoadWarning>) -> Result<(), TimingError> {
    let Some(found) = found else {
        warnings.push(LoadWarning::MissingVersion);
        return Ok(());
    };

    let current = PluginVersion::current();
    match found.parse::<PluginVersion>() {
        Ok(version) if version > current => Err(TimingError::IncompatibleVersion {
            found: found.to_string(),
            current: current.to_string(),
        }),
        Ok(version) if version < current => {
            warnings.push(LoadWarning::OlderVersion(found.to_string()));
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(_) => {
            warnings.push(LoadWarning::UnreadableVersion(found.to_string()));
            Ok(())
        }
    }
}

fn header_number(
    value: Option<&NumberOrText>,
    field: &'static str,
    warnings: &mut Vec<LoadWarning>,
) -> Option<u64> {
    match value.and_then(NumberOrText::as_i64) {
        Some(n) if n >= 0 => Some(n as u64),
        _ => {
            warnings.push(LoadWarning::MissingHeaderField(field));
            None
        }
    }
}

fn offset_fits(offset_time_ms: u64, offset_frame: u64, fps: u32) -> bool {
    i64::try_from(offset_frame)
        .ok()
        .and_then(|f| frame::time_ms_for(f, fps).ok())
        .and_then(|ms| ms.checked_add(offset_time_ms))
        .is_some_and(|total| total <= MAX_ELAPSED_MS)
}

impl TimingDocument {
    /// Snapshot in the persisted shape, stamped with the current plugin and date.
    pub fn export(&self) -> TimingFile {
        let data = self
            .rows
            .iter()
            .map(|row| RowRecord {
                time: row.time(),
                frame: NumberOrText::Text(row.frame.to_string()),
                interval: Some(NumberOrText::Text(
                    row.interval
                        .map(|i| i.to_string())
                        .unwrap_or_else(|| NO_INTERVAL.to_string()),
                )),
                note: row.note.clone(),
            })
            .collect();

        TimingFile {
            infos: Some(TimingInfos {
                plugin_name: Some(PLUGIN_NAME.to_string()),
                plugin_version: Some(PLUGIN_VERSION.to_string()),
                fps: Some(NumberOrText::Number(self.fps as i64)),
                offset_time: Some(NumberOrText::Number(self.offset_time_ms as i64)),
                offset_frame: Some(NumberOrText::Number(self.offset_frame as i64)),
                date: Some(Local::now().format(DATE_FORMAT).to_string()),
            }),
            data,
        }
    }

    /// Validates `file` and replaces this document with it.
    ///
    /// Nothing changes when an error is returned. On success the loaded rows
    /// become the clean baseline.
    pub fn import(&mut self, file: TimingFile, default_fps: u32) -> Result<LoadReport, TimingError> {
        let infos = file.infos.ok_or_else(|| {
            TimingError::MalformedDocument(
                "file header cannot be recovered, fps and offsets are not available".to_string(),
            )
        })?;
        let mut warnings = Vec::new();

        match infos.plugin_name.as_deref() {
            None | Some("") => warnings.push(LoadWarning::MissingPluginName),
            Some(name) if name != PLUGIN_NAME => {
                warnings.push(LoadWarning::PluginNameMismatch(name.to_string()))
            }
            Some(_) => {}
        }

        check_version(infos.plugin_version.as_deref(), &mut warnings)?;

        let fps = match header_number(infos.fps.as_ref(), "fps", &mut warnings) {
            Some(fps) if fps > 0 && fps <= u32::MAX as u64 => {
                let fps = fps as u32;
                if frame::validate_fps(fps).is_err() {
                    warnings.push(LoadWarning::FpsOutOfRange(fps));
                }
                fps
            }
            Some(_) => {
                warnings.push(LoadWarning::MissingHeaderField("fps"));
                default_fps
            }
            None => default_fps,
        };
        frame::tick_interval_ms(fps)?;

        let offset_time_ms =
            match header_number(infos.offset_time.as_ref(), "offset_time", &mut warnings) {
                Some(ms) if ms <= MAX_ELAPSED_MS => ms,
                Some(ms) => {
                    warnings.push(LoadWarning::HeaderFieldOutOfRange("offset_time", ms));
                    0
                }
                None => 0,
            };
        let offset_frame =
            match header_number(infos.offset_frame.as_ref(), "offset_frame", &mut warnings) {
                Some(f) if offset_fits(offset_time_ms, f, fps) => f,
                Some(f) => {
                    warnings.push(LoadWarning::HeaderFieldOutOfRange("offset_frame", f));
                    0
                }
                None => 0,
            };

        let mut rows = Vec::with_capacity(file.data.len());
        for (index, record) in file.data.iter().enumerate() {
            let frame_number = record
                .frame
                .as_i64()
                .filter(|f| *f >= 0)
                .ok_or_else(|| {
                    TimingError::MalformedDocument(format!(
                        "row {}: frame '{}' is not a valid number",
                        index + 1,
                        record.frame
                    ))
                })?;
            let time_ms = match frame::parse_time(&record.time) {
                Ok(ms) => ms,
                Err(_) => frame::time_ms_for(frame_number, fps)
                    .ok()
                    .filter(|ms| *ms <= MAX_ELAPSED_MS)
                    .ok_or_else(|| {
                        TimingError::MalformedDocument(format!(
                            "row {}: frame {} is past 59:59:999",
                            index + 1,
                            frame_number
                        ))
                    })?,
            };
            if rows
                .last()
                .is_some_and(|prev: &TimingRow| prev.frame > frame_number as u64)
            {
                warnings.push(LoadWarning::FramesOutOfOrder(index + 1));
            }
            rows.push(TimingRow::new(time_ms, frame_number as u64, record.note.clone()));
        }
        recompute_intervals(&mut rows);

        for warning in &warnings {
            warn!("{}", warning);
        }

        let mut loaded = TimingDocument::default();
        loaded.header = DocumentHeader {
            plugin_name: infos.plugin_name.unwrap_or_default(),
            plugin_version: infos.plugin_version.unwrap_or_default(),
            created_at: infos.date,
        };
        loaded.fps = fps;
        loaded.offset_time_ms = offset_time_ms;
        loaded.offset_frame = offset_frame;
        loaded.rows = rows;
        self.replace(loaded);

        Ok(LoadReport { warnings })
    }

    pub fn to_json(&self) -> Result<String, TimingError> {
        let mut buffer = Vec::new();
        write_pretty(&mut buffer, &self.export())?;
        String::from_utf8(buffer).map_err(|e| TimingError::MalformedDocument(e.to_string()))
    }

    /// Reads and imports a timing file. The document is untouched on error.
    pub fn load(&mut self, path: &Path, default_fps: u32) -> Result<LoadReport, TimingError> {
        let file = read_timing_file(path)?;
        let report = self.import(file, default_fps)?;
        info!("Timing loaded from {}", path.display());
        Ok(report)
    }

    /// Writes the document to `path` and makes it the clean baseline.
    pub fn save(&mut self, path: &Path) -> Result<(), TimingError> {
        let file = self.export();
        write_timing_file(path, &file)?;

        if let Some(infos) = file.infos {
            self.header = DocumentHeader {
                plugin_name: PLUGIN_NAME.to_string(),
                plugin_version: PLUGIN_VERSION.to_string(),
                created_at: infos.date,
            };
        }
        self.mark_saved();
        info!("Timing saved to {}", path.display());
        Ok(())
    }
}

fn write_pretty<W: Write>(writer: W, file: &TimingFile) -> Result<(), TimingError> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    file.serialize(&mut serializer)?;
    Ok(())
}

pub fn read_timing_file(path: &Path) -> Result<TimingFile, TimingError> {
    if !path.exists() {
        return Err(TimingError::FileNotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| {
        TimingError::MalformedDocument(format!(
            "{} could not be read, is it a valid JSON file with contents? ({})",
            path.display(),
            e
        ))
    })
}

/// Writes through a temporary file in the same directory so the destination
/// is either fully replaced or left as it was.
pub fn write_timing_file(path: &Path, file: &TimingFile) -> Result<(), TimingError> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(directory)?;
    write_pretty(&mut temp, file)?;
    temp.write_all(b"\n")?;
    temp.flush()?;
    temp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_from(json: &str) -> TimingFile {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_numbers_and_strings() {
        let file = file_from(
            r#"{"infos": {"plugin_name": "Animation Timer", "plugin_version": "1.4.1",
                "fps": "25", "offset_time": 0, "offset_frame": "0"},
                "data": [{"time": "00:00:480", "frame": 12, "interval": "-", "note": "a"},
                         {"time": "00:00:960", "frame": "24", "interval": 5, "note": ""}]}"#,
        );
        let mut document = TimingDocument::new();
        let report = document.import(file, 24).unwrap();
        assert!(report.is_clean(), "{:?}", report);
        assert_eq!(document.fps(), 25);
        let intervals: Vec<_> = document.rows().iter().map(|r| r.interval).collect();
        assert_eq!(intervals, vec![None, Some(12)]);
    }

    #[test]
    fn missing_header_fields_fall_back() {
        let file = file_from(
            r#"{"infos": {"plugin_name": "Animation Timer", "plugin_version": "1.4.1"},
                "data": [{"time": "", "frame": "48", "note": ""}]}"#,
        );
        let mut document = TimingDocument::new();
        let report = document.import(file, 30).unwrap();
        assert_eq!(document.fps(), 30);
        assert_eq!(document.offset_time_ms(), 0);
        assert!(report.warnings.contains(&LoadWarning::MissingHeaderField("fps")));
        assert!(report.warnings.contains(&LoadWarning::MissingHeaderField("offset_time")));
        assert!(report.warnings.contains(&LoadWarning::MissingHeaderField("offset_frame")));
        // Unparseable time is rebuilt from the frame.
        assert_eq!(document.row(0).unwrap().time_ms, 1_600);
    }

    #[test]
    fn missing_infos_is_malformed() {
        let file = file_from(r#"{"data": []}"#);
        let mut document = TimingDocument::new();
        document.capture(100, 2, "").unwrap();
        assert!(matches!(
            document.import(file, 24),
            Err(TimingError::MalformedDocument(_))
        ));
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn bad_row_frame_is_malformed() {
        let file = file_from(
            r#"{"infos": {"plugin_name": "Animation Timer", "plugin_version": "1.4.1", "fps": 24},
                "data": [{"time": "00:00:500", "frame": "twelve", "note": ""}]}"#,
        );
        let mut document = TimingDocument::new();
        assert!(matches!(
            document.import(file, 24),
            Err(TimingError::MalformedDocument(_))
        ));
    }

    #[test]
    fn out_of_range_offset_time_warns() {
        let file = file_from(
            r#"{"infos": {"plugin_name": "Animation Timer", "plugin_version": "1.4.1", "fps": 24,
                "offset_time": 5000000, "offset_frame": 0}, "data": []}"#,
        );
        let mut document = TimingDocument::new();
        let report = document.import(file, 24).unwrap();
        assert_eq!(document.offset_time_ms(), 0);
        assert_eq!(
            report.warnings,
            vec![LoadWarning::HeaderFieldOutOfRange("offset_time", 5_000_000)]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn huge_offset_frame_warns() {
        let file = file_from(
            r#"{"infos": {"plugin_name": "Animation Timer", "plugin_version": "1.4.1", "fps": 24,
                "offset_time": 0, "offset_frame": "90000000000000000"}, "data": []}"#,
        );
        let mut document = TimingDocument::new();
        let report = document.import(file, 24).unwrap();
        assert_eq!(document.offset_frame(), 0);
        assert_eq!(
            report.warnings,
            vec![LoadWarning::HeaderFieldOutOfRange(
                "offset_frame",
                90_000_000_000_000_000
            )]
        );
        assert_eq!(document.total_offset_ms().unwrap(), 0);
    }

    #[test]
    fn huge_frame_without_time_is_malformed() {
        let file = file_from(
            r#"{"infos": {"plugin_name": "Animation Timer", "plugin_version": "1.4.1", "fps": 24,
                "offset_time": 0, "offset_frame": 0},
                "data": [{"time": "", "frame": "90000000000000000", "note": ""}]}"#,
        );
        let mut document = TimingDocument::new();
        document.capture(100, 2, "").unwrap();
        assert!(matches!(
            document.import(file, 24),
            Err(TimingError::MalformedDocument(_))
        ));
        assert_eq!(document.len(), 1);
    }

    #[test]
    fn frames_out_of_order_warn() {
        let file = file_from(
            r#"{"infos": {"plugin_name": "Animation Timer", "plugin_version": "1.4.1", "fps": 24,
                "offset_time": 0, "offset_frame": 0},
                "data": [{"time": "00:01:000", "frame": "24", "note": ""},
                         {"time": "00:00:500", "frame": "12", "note": ""}]}"#,
        );
        let mut document = TimingDocument::new();
        let report = document.import(file, 24).unwrap();
        assert_eq!(report.warnings, vec![LoadWarning::FramesOutOfOrder(2)]);
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn foreign_plugin_name_warns() {
        let file = file_from(
            r#"{"infos": {"plugin_name": "Other Tool", "plugin_version": "1.4.1", "fps": 24,
                "offset_time": 0, "offset_frame": 0}, "data": []}"#,
        );
        let mut document = TimingDocument::new();
        let report = document.import(file, 24).unwrap();
        assert_eq!(
            report.warnings,
            vec![LoadWarning::PluginNameMismatch("Other Tool".to_string())]
        );
    }

    #[test]
    fn export_writes_strings_for_rows() {
        let mut document = TimingDocument::new();
        document.capture(500, 12, "").unwrap();
        document.capture(1_000, 24, "contact").unwrap();
        let json = document.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["infos"]["plugin_name"], "Animation Timer");
        assert_eq!(value["infos"]["fps"], 24);
        assert_eq!(value["data"][0]["frame"], "12");
        assert_eq!(value["data"][0]["interval"], "-");
        assert_eq!(value["data"][1]["interval"], "12");
        assert_eq!(value["data"][1]["time"], "00:01:000");
        assert_eq!(value["data"][1]["note"], "contact");
    }
}
