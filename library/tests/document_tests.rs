//! Capture table behaviour: capture, edit, export/import and version checks.

use timing_core::TimingError;
use timing_core::model::persistence::{NumberOrText, TimingFile};
use timing_core::model::{LoadWarning, PLUGIN_VERSION, TimingDocument};

fn captured_document() -> TimingDocument {
    let mut document = TimingDocument::with_fps(24).unwrap();
    document.capture(500, 12, "").unwrap();
    document.capture(1_000, 24, "").unwrap();
    document.capture(1_500, 36, "settle").unwrap();
    document
}

fn with_version(mut file: TimingFile, version: &str) -> TimingFile {
    if let Some(infos) = file.infos.as_mut() {
        infos.plugin_version = Some(version.to_string());
    }
    file
}

#[test]
fn test_capture_export_import_roundtrip() {
    let document = captured_document();
    let times: Vec<_> = document.rows().iter().map(|r| r.time()).collect();
    assert_eq!(times, vec!["00:00:500", "00:01:000", "00:01:500"]);

    let exported = document.export();
    let json = serde_json::to_string(&exported).expect("Failed to serialize timing");
    let parsed: TimingFile = serde_json::from_str(&json).expect("Failed to parse timing");

    let mut loaded = TimingDocument::new();
    let report = loaded.import(parsed, 30).unwrap();
    assert!(report.is_clean(), "unexpected warnings: {:?}", report.warnings);

    assert_eq!(loaded.fps(), 24);
    let frames: Vec<_> = loaded.rows().iter().map(|r| r.frame).collect();
    let notes: Vec<_> = loaded.rows().iter().map(|r| r.note.as_str()).collect();
    let intervals: Vec<_> = loaded.rows().iter().map(|r| r.interval).collect();
    assert_eq!(frames, vec![12, 24, 36]);
    assert_eq!(notes, vec!["", "", "settle"]);
    assert_eq!(intervals, vec![None, Some(12), Some(12)]);
    assert_eq!(loaded.rows(), document.rows());
    assert!(!loaded.is_dirty());
}

#[test]
fn test_import_ignores_stored_intervals() {
    let mut file = captured_document().export();
    file.data[2].interval = Some(NumberOrText::Text("999".to_string()));

    let mut loaded = TimingDocument::new();
    loaded.import(file, 24).unwrap();
    assert_eq!(loaded.row(2).unwrap().interval, Some(12));
}

#[test]
fn test_frame_edit_clamps() {
    let mut document = TimingDocument::with_fps(24).unwrap();
    for frame in [10u64, 20, 30] {
        document.capture(frame * 40, frame, "").unwrap();
    }

    assert_eq!(document.edit_frame(1, "25").unwrap(), 25);
    assert_eq!(document.row(1).unwrap().time(), "00:01:042");

    assert_eq!(document.edit_frame(1, "8").unwrap(), 11);
    assert_eq!(document.edit_frame(1, "35").unwrap(), 29);

    let before = document.rows().to_vec();
    assert!(matches!(
        document.edit_frame(1, "2O"),
        Err(TimingError::InvalidFrameEdit(_))
    ));
    assert_eq!(document.rows(), before.as_slice());
}

#[test]
fn test_older_version_loads_with_warning() {
    let file = with_version(captured_document().export(), "1.3.0");
    let mut loaded = TimingDocument::new();
    let report = loaded.import(file, 24).unwrap();
    assert_eq!(report.warnings, vec![LoadWarning::OlderVersion("1.3.0".to_string())]);
    assert_eq!(loaded.len(), 3);
}

#[test]
fn test_newer_version_is_refused() {
    let file = with_version(captured_document().export(), "99.0.0");

    let mut current = TimingDocument::new();
    current.capture(250, 6, "keep me").unwrap();

    match current.import(file, 24) {
        Err(TimingError::IncompatibleVersion { found, current: running }) => {
            assert_eq!(found, "99.0.0");
            assert_eq!(running, PLUGIN_VERSION);
        }
        other => panic!("expected IncompatibleVersion, got {:?}", other.map(|_| ())),
    }

    assert_eq!(current.len(), 1);
    assert_eq!(current.row(0).unwrap().note, "keep me");
    assert!(current.is_dirty());
}

#[test]
fn test_missing_version_warns() {
    let mut file = captured_document().export();
    if let Some(infos) = file.infos.as_mut() {
        infos.plugin_version = None;
    }
    let mut loaded = TimingDocument::new();
    let report = loaded.import(file, 24).unwrap();
    assert_eq!(report.warnings, vec![LoadWarning::MissingVersion]);
}

#[test]
fn test_dirty_flag_follows_mutations() {
    let mut document = TimingDocument::new();
    assert!(!document.is_dirty());

    document.capture(500, 12, "").unwrap();
    assert!(document.is_dirty());

    document.mark_saved();
    assert!(!document.is_dirty());

    document.clear();
    assert!(document.is_dirty());
}

#[test]
fn test_load_becomes_clean_baseline() {
    let file = captured_document().export();
    let mut loaded = TimingDocument::new();
    loaded.capture(10, 0, "").unwrap();
    assert!(loaded.is_dirty());

    loaded.import(file, 24).unwrap();
    assert!(!loaded.is_dirty());

    loaded.remove(&[0]);
    assert!(loaded.is_dirty());
}

#[test]
fn test_huge_frame_edit_on_last_row_is_rejected() {
    let mut document = captured_document();
    let before = document.rows().to_vec();
    assert!(matches!(
        document.edit_frame(2, "9000000000000000000"),
        Err(TimingError::InvalidFrameEdit(_))
    ));
    assert_eq!(document.rows(), before.as_slice());
}

#[test]
fn test_failed_save_leaves_file_and_dirty_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("walk.timing");

    let mut document = captured_document();
    document.save(&path).unwrap();
    let original = std::fs::read(&path).unwrap();

    document.capture(2_000, 48, "").unwrap();
    assert!(document.is_dirty());

    let missing = dir.path().join("missing").join("walk.timing");
    assert!(document.save(&missing).is_err());
    assert!(!missing.exists());

    // A directory cannot be replaced by the finished file.
    let blocked = dir.path().join("blocked.timing");
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("keep.txt"), b"keep").unwrap();
    assert!(document.save(&blocked).is_err());
    assert_eq!(std::fs::read(blocked.join("keep.txt")).unwrap(), b"keep");

    assert!(document.is_dirty());
    assert_eq!(std::fs::read(&path).unwrap(), original);
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 2, "temporary files were left behind");
}
