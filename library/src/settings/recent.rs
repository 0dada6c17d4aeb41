use std::path::{Path, PathBuf};

use super::SettingsStore;

pub const RECENT_GROUP: &str = "RecentTimings";
pub const MAX_RECENT_LIMIT: usize = 20;

const KEY_PREFIX: &str = "recent_timing_";

/// Recently opened or saved timing files, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecentTimings {
    entries: Vec<PathBuf>,
    max: usize,
}

impl RecentTimings {
    pub fn new(max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max: max.min(MAX_RECENT_LIMIT),
        }
    }

    /// Reads `recent_timing_1..N` from the store, in key order.
    pub fn load(store: &dyn SettingsStore, max: usize) -> Self {
        let mut numbered: Vec<(u32, String)> = store
            .keys(RECENT_GROUP)
            .into_iter()
            .filter_map(|key| {
                let index = key.strip_prefix(KEY_PREFIX)?.parse().ok()?;
                let value = store.read(RECENT_GROUP, &key)?;
                Some((index, value))
            })
            .collect();
        numbered.sort_by_key(|(index, _)| *index);

        let mut recent = Self::new(max);
        for (_, path) in numbered {
            if path.trim().is_empty() {
                continue;
            }
            let path = PathBuf::from(path);
            if !recent.entries.contains(&path) {
                recent.entries.push(path);
            }
        }
        recent.entries.truncate(recent.max);
        recent
    }

    pub fn save(&self, store: &mut dyn SettingsStore) {
        store.remove_group(RECENT_GROUP);
        for (i, path) in self.entries.iter().enumerate() {
            store.write(
                RECENT_GROUP,
                &format!("{}{}", KEY_PREFIX, i + 1),
                &path.to_string_lossy(),
            );
        }
    }

    /// Moves `path` to the top, dropping the oldest entry past the limit.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.entries.retain(|existing| *existing != path);
        self.entries.insert(0, path);
        self.entries.truncate(self.max);
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        let before = self.entries.len();
        self.entries.retain(|existing| existing != path);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&Path> {
        self.entries.first().map(PathBuf::as_path)
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn set_max(&mut self, max: usize) {
        self.max = max.min(MAX_RECENT_LIMIT);
        self.entries.truncate(self.max);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
