//! Per-window element map persistence.
//!
//! A window's recognized text elements can be written to
//! `interface_cache/{title}.json` and read back on a later visit,
//! sparing an OCR pass for callers that opt in. The cache is best
//! effort only: nothing invalidates it when the window changes, the
//! click paths never consult it on their own, and any unreadable file
//! is treated as a miss.

use scry_vision::{sanitize_filename, ElementMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct InterfaceCache {
    dir: PathBuf,
}

impl InterfaceCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, window_title: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", sanitize_filename(window_title)))
    }

    /// Persist a window's element map. Failures are logged and swallowed;
    /// a cache that cannot be written must not break the capture flow.
    pub fn save(&self, window_title: &str, elements: &ElementMap) -> Option<PathBuf> {
        let path = self.entry_path(window_title);
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("could not create cache directory {}: {e}", self.dir.display());
            return None;
        }

        let json = match serde_json::to_string_pretty(elements) {
            Ok(json) => json,
            Err(e) => {
                warn!("could not serialize element map for '{window_title}': {e}");
                return None;
            }
        };

        match std::fs::write(&path, json) {
            Ok(()) => {
                info!(
                    "cached {} elements for '{window_title}' at {}",
                    elements.len(),
                    path.display()
                );
                Some(path)
            }
            Err(e) => {
                warn!("could not write cache file {}: {e}", path.display());
                None
            }
        }
    }

    /// Load a window's element map from a previous run. Missing, partial
    /// or corrupt files all read as a miss.
    pub fn load(&self, window_title: &str) -> Option<ElementMap> {
        let path = self.entry_path(window_title);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => {
                debug!("no cache entry for '{window_title}'");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(elements) => Some(elements),
            Err(e) => {
                warn!("ignoring corrupt cache file {}: {e}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = InterfaceCache::new(dir.path());

        let mut elements = ElementMap::new();
        elements.insert("вход".to_string(), (120, 45));
        elements.insert("submit".to_string(), (300, 200));
        elements.insert("отмена".to_string(), (40, 200));

        cache
            .save("Мой браузер - Вход", &elements)
            .expect("cache save failed");
        let loaded = cache.load("Мой браузер - Вход").expect("cache load failed");

        assert_eq!(loaded, elements);
    }

    #[test]
    fn test_missing_entry_is_a_miss() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = InterfaceCache::new(dir.path());
        assert!(cache.load("Never Seen").is_none());
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = InterfaceCache::new(dir.path());

        let path = dir
            .path()
            .join(format!("{}.json", sanitize_filename("Broken")));
        std::fs::write(&path, "{ \"вход\": [12").expect("Failed to write file");

        assert!(cache.load("Broken").is_none());
    }

    #[test]
    fn test_title_is_sanitized_for_the_filename() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache = InterfaceCache::new(dir.path());

        let elements = ElementMap::new();
        let path = cache
            .save("Editor: notes/today.txt", &elements)
            .expect("cache save failed");

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some("Editor_ notes_today_txt.json")
        );
    }
}
