//! File-backed config store

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{ConfigStore, MemoryStore};

/// A [`ConfigStore`] persisted as a flat TOML table.
///
/// Mutations only touch the in-memory map; [`TomlStore::save`] flushes to
/// disk. Writes are fire-and-forget from the engine's point of view, so the
/// caller decides when to flush (the CLI does it once per invocation).
#[derive(Debug)]
pub struct TomlStore {
    path: PathBuf,
    entries: MemoryStore,
    dirty: bool,
}

impl TomlStore {
    /// Load the store from a file or the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(PathBuf::from)
            .or_else(Self::default_path)
            .context("Could not determine config path")?;

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read filter state from {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse filter state from {}", path.display()))?
        } else {
            MemoryStore::new()
        };

        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Write the store back to its file (with advisory file locking).
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(&self.entries).context("Failed to serialize filter state")?;

        // Use a lockfile to prevent concurrent writes
        let lock_path = self.path.with_extension("toml.lock");
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

        use fs2::FileExt;
        lock_file
            .lock_exclusive()
            .with_context(|| "Failed to acquire filter state file lock")?;

        let result = std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write filter state to {}", self.path.display()));

        let _ = fs2::FileExt::unlock(&lock_file);

        if result.is_ok() {
            self.dirty = false;
        }
        result
    }

    /// Get the default state file path.
    /// Uses the platform config directory (via dirs::config_dir), falling back to ~/.config
    pub fn default_path() -> Option<PathBuf> {
        let config_base =
            dirs::config_dir().or_else(|| dirs::home_dir().map(|d| d.join(".config")))?;
        Some(config_base.join("viewfinder").join("filters.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for TomlStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.entries.get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.entries.set_int(key, value);
        self.dirty = true;
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get_string(key)
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.entries.set_string(key, value);
        self.dirty = true;
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.entries.get_bool(key)
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.entries.set_bool(key, value);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.toml");

        let mut store = TomlStore::load(Some(&path)).unwrap();
        store.set_int("filters/num_rules", 2);
        store.set_string("filters/string0", ">=2");
        store.set_bool("filters/raw_text_7", true);
        store.save().unwrap();

        let reloaded = TomlStore::load(Some(&path)).unwrap();
        assert_eq!(reloaded.get_int("filters/num_rules"), Some(2));
        assert_eq!(reloaded.get_string("filters/string0"), Some(">=2".to_string()));
        assert_eq!(reloaded.get_bool("filters/raw_text_7"), Some(true));
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        let store = TomlStore::load(Some(&path)).unwrap();
        assert_eq!(store.get_int("filters/num_rules"), None);
    }

    #[test]
    fn test_save_skipped_when_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.toml");

        let mut store = TomlStore::load(Some(&path)).unwrap();
        store.save().unwrap();
        // nothing was mutated, so no file should appear
        assert!(!path.exists());
    }
}
