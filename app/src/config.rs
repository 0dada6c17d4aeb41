use directories::ProjectDirs;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use timing_core::settings::{MemorySettings, SettingsStore};
use timing_core::TimingError;

pub const WINDOW_GROUP: &str = "Window";

type Groups = BTreeMap<String, BTreeMap<String, String>>;

/// On-disk shape: one TOML table per settings group, string values only.
#[derive(Serialize, Deserialize, Default)]
#[serde(transparent)]
struct SettingsFile {
    groups: Groups,
}

fn get_config_path() -> Option<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "animation-timer", "Animation Timer") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            if let Err(e) = fs::create_dir_all(config_dir) {
                error!("Failed to create config directory: {}", e);
                return None;
            }
        }
        return Some(config_dir.join("settings.toml"));
    }
    None
}

/// Settings kept in `settings.toml` under the user config directory.
///
/// Reads and writes go to memory; [`SettingsStore::flush`] writes the file.
pub struct TomlSettings {
    path: Option<PathBuf>,
    store: MemorySettings,
    changed: bool,
}

impl TomlSettings {
    pub fn load() -> Self {
        Self::load_from(get_config_path())
    }

    pub fn load_from(path: Option<PathBuf>) -> Self {
        let groups = path.as_deref().map(read_groups).unwrap_or_default();
        Self {
            path,
            store: MemorySettings::from_groups(groups),
            changed: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn read_groups(path: &Path) -> Groups {
    if !path.exists() {
        return Groups::new();
    }
    match fs::read_to_string(path) {
        Ok(toml_str) => match toml::from_str::<SettingsFile>(&toml_str) {
            Ok(file) => file.groups,
            Err(e) => {
                warn!("Failed to parse settings file, using defaults: {}", e);
                Groups::new()
            }
        },
        Err(e) => {
            warn!("Failed to read settings file, using defaults: {}", e);
            Groups::new()
        }
    }
}

impl SettingsStore for TomlSettings {
    fn read(&self, group: &str, key: &str) -> Option<String> {
        self.store.read(group, key)
    }

    fn write(&mut self, group: &str, key: &str, value: &str) {
        if self.store.read(group, key).as_deref() != Some(value) {
            self.store.write(group, key, value);
            self.changed = true;
        }
    }

    fn remove_group(&mut self, group: &str) {
        if !self.store.keys(group).is_empty() {
            self.store.remove_group(group);
            self.changed = true;
        }
    }

    fn keys(&self, group: &str) -> Vec<String> {
        self.store.keys(group)
    }

    fn flush(&mut self) -> Result<(), TimingError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if !self.changed {
            return Ok(());
        }

        let file = SettingsFile {
            groups: self.store.groups().clone(),
        };
        let toml_str = toml::to_string_pretty(&file).map_err(|e| {
            error!("Failed to serialize settings: {}", e);
            TimingError::Io(io::Error::other(e))
        })?;
        if let Err(e) = fs::write(path, toml_str) {
            error!("Failed to write settings file: {}", e);
            return Err(e.into());
        }
        self.changed = false;
        info!("Settings saved to {}", path.display());
        Ok(())
    }
}

/// Geometry and view toggles of the main window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
    pub always_on_top: bool,
    pub show_interval: bool,
    pub show_note: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 340.0,
            height: 520.0,
            always_on_top: false,
            show_interval: true,
            show_note: true,
        }
    }
}

impl WindowSettings {
    const MIN_SIZE: f32 = 200.0;

    pub fn load(store: &dyn SettingsStore) -> Self {
        let defaults = Self::default();
        let size = |key: &str, default: f32| {
            store
                .read(WINDOW_GROUP, key)
                .and_then(|v| v.trim().parse::<f32>().ok())
                .filter(|v| v.is_finite() && *v >= Self::MIN_SIZE)
                .unwrap_or(default)
        };
        Self {
            width: size("width", defaults.width),
            height: size("height", defaults.height),
            always_on_top: store.read_bool(WINDOW_GROUP, "always_on_top", defaults.always_on_top),
            show_interval: store.read_bool(WINDOW_GROUP, "show_interval", defaults.show_interval),
            show_note: store.read_bool(WINDOW_GROUP, "show_note", defaults.show_note),
        }
    }

    pub fn store(&self, store: &mut dyn SettingsStore) {
        store.write(WINDOW_GROUP, "width", &self.width.round().to_string());
        store.write(WINDOW_GROUP, "height", &self.height.round().to_string());
        store.write(WINDOW_GROUP, "always_on_top", &self.always_on_top.to_string());
        store.write(WINDOW_GROUP, "show_interval", &self.show_interval.to_string());
        store.write(WINDOW_GROUP, "show_note", &self.show_note.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn flush_then_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut settings = TomlSettings::load_from(Some(path.clone()));
        settings.write("Preferences", "default_fps", "30");
        settings.write("RecentTimings", "recent_timing_1", "/shots/a.timing");
        settings.flush().unwrap();

        let reloaded = TomlSettings::load_from(Some(path));
        assert_eq!(reloaded.read("Preferences", "default_fps").as_deref(), Some("30"));
        assert_eq!(reloaded.keys("RecentTimings"), vec!["recent_timing_1".to_string()]);
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let settings = TomlSettings::load_from(Some(path));
        assert!(settings.keys("Preferences").is_empty());
        assert_eq!(WindowSettings::load(&settings), WindowSettings::default());
    }

    #[test]
    fn without_path_flush_is_noop() {
        let mut settings = TomlSettings::load_from(None);
        settings.write("Window", "width", "400");
        assert!(settings.flush().is_ok());
        assert_eq!(settings.read("Window", "width").as_deref(), Some("400"));
    }

    #[test]
    fn window_settings_roundtrip_and_limits() {
        let mut store = MemorySettings::new();
        let window = WindowSettings {
            width: 420.0,
            height: 640.0,
            always_on_top: true,
            show_interval: false,
            show_note: true,
        };
        window.store(&mut store);
        assert_eq!(WindowSettings::load(&store), window);

        store.write(WINDOW_GROUP, "width", "12");
        assert_eq!(WindowSettings::load(&store).width, WindowSettings::default().width);
    }
}
