//! Grouped key/value settings and the typed views built on them.

mod preferences;
mod recent;

use std::collections::BTreeMap;

pub use preferences::{PREFERENCES_GROUP, Preferences};
pub use recent::{MAX_RECENT_LIMIT, RECENT_GROUP, RecentTimings};

use crate::error::TimingError;

/// INI-like storage: string values addressed by group and key.
pub trait SettingsStore {
    fn read(&self, group: &str, key: &str) -> Option<String>;
    fn write(&mut self, group: &str, key: &str, value: &str);
    fn remove_group(&mut self, group: &str);
    fn keys(&self, group: &str) -> Vec<String>;

    /// Persists pending writes. Stores without a backing file have nothing to do.
    fn flush(&mut self) -> Result<(), TimingError> {
        Ok(())
    }

    fn read_or(&self, group: &str, key: &str, default: &str) -> String {
        self.read(group, key).unwrap_or_else(|| default.to_string())
    }

    fn read_bool(&self, group: &str, key: &str, default: bool) -> bool {
        match self.read(group, key) {
            Some(value) => parse_bool(&value).unwrap_or(default),
            None => default,
        }
    }

    fn read_u32(&self, group: &str, key: &str, default: u32) -> u32 {
        self.read(group, key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySettings {
    groups: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &BTreeMap<String, BTreeMap<String, String>> {
        &self.groups
    }

    pub fn from_groups(groups: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self { groups }
    }
}

impl SettingsStore for MemorySettings {
    fn read(&self, group: &str, key: &str) -> Option<String> {
        self.groups.get(group)?.get(key).cloned()
    }

    fn write(&mut self, group: &str, key: &str, value: &str) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_group(&mut self, group: &str) {
        self.groups.remove(group);
    }

    fn keys(&self, group: &str) -> Vec<String> {
        self.groups
            .get(group)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_fall_back() {
        let mut settings = MemorySettings::new();
        settings.write("Window", "width", "480");
        settings.write("Window", "always_on_top", "false");
        settings.write("Window", "height", "tall");

        assert_eq!(settings.read_u32("Window", "width", 300), 480);
        assert_eq!(settings.read_u32("Window", "height", 600), 600);
        assert!(!settings.read_bool("Window", "always_on_top", true));
        assert!(settings.read_bool("Window", "missing", true));
        assert_eq!(settings.read_or("Other", "key", "x"), "x");
    }

    #[test]
    fn remove_group_drops_keys() {
        let mut settings = MemorySettings::new();
        settings.write("RecentTimings", "recent_timing_1", "/a.timing");
        assert_eq!(settings.keys("RecentTimings").len(), 1);
        settings.remove_group("RecentTimings");
        assert!(settings.keys("RecentTimings").is_empty());
    }
}
