use std::path::PathBuf;

use log::warn;

use super::SettingsStore;
use super::recent::MAX_RECENT_LIMIT;
use crate::core::frame::{self, DEFAULT_FPS};

pub const PREFERENCES_GROUP: &str = "Preferences";

const DEFAULT_MAX_RECENT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    /// Frame rate of a new timing.
    pub default_fps: u32,
    /// Where file dialogs open unless project directories are preferred.
    pub default_directory: Option<PathBuf>,
    pub max_recent_timing: usize,
    pub auto_load_last_timing: bool,
    pub project_save_in_dirs: bool,
    pub stop_timer_on_focus_out: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_fps: DEFAULT_FPS,
            default_directory: None,
            max_recent_timing: DEFAULT_MAX_RECENT,
            auto_load_last_timing: false,
            project_save_in_dirs: false,
            stop_timer_on_focus_out: true,
        }
    }
}

impl Preferences {
    pub fn load(store: &dyn SettingsStore) -> Self {
        let defaults = Self::default();

        let default_fps = store.read_u32(PREFERENCES_GROUP, "default_fps", defaults.default_fps);
        let default_fps = match frame::validate_fps(default_fps) {
            Ok(fps) => fps,
            Err(e) => {
                warn!("Ignoring stored default fps: {}", e);
                defaults.default_fps
            }
        };

        let default_directory = store
            .read(PREFERENCES_GROUP, "default_directory")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let max_recent_timing = (store.read_u32(
            PREFERENCES_GROUP,
            "max_recent_timing",
            defaults.max_recent_timing as u32,
        ) as usize)
            .min(MAX_RECENT_LIMIT);

        Self {
            default_fps,
            default_directory,
            max_recent_timing,
            auto_load_last_timing: store.read_bool(
                PREFERENCES_GROUP,
                "auto_load_last_timing",
                defaults.auto_load_last_timing,
            ),
            project_save_in_dirs: store.read_bool(
                PREFERENCES_GROUP,
                "project_save_in_dirs",
                defaults.project_save_in_dirs,
            ),
            stop_timer_on_focus_out: store.read_bool(
                PREFERENCES_GROUP,
                "stop_timer_on_out_focus",
                defaults.stop_timer_on_focus_out,
            ),
        }
    }

    pub fn store(&self, store: &mut dyn SettingsStore) {
        store.write(PREFERENCES_GROUP, "default_fps", &self.default_fps.to_string());
        store.write(
            PREFERENCES_GROUP,
            "default_directory",
            &self
                .default_directory
                .as_ref()
                .map(|dir| dir.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        store.write(
            PREFERENCES_GROUP,
            "max_recent_timing",
            &self.max_recent_timing.to_string(),
        );
        store.write(
            PREFERENCES_GROUP,
            "auto_load_last_timing",
            &self.auto_load_last_timing.to_string(),
        );
        store.write(
            PREFERENCES_GROUP,
            "project_save_in_dirs",
            &self.project_save_in_dirs.to_string(),
        );
        store.write(
            PREFERENCES_GROUP,
            "stop_timer_on_out_focus",
            &self.stop_timer_on_focus_out.to_string(),
        );
    }
}
