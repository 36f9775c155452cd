use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};

use crate::store::schema::LocalStorageData;
use crate::topic::recent::{KeyValueStore, StoreError};

const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// File-backed key-value store under the user's data directory. Every write
/// is flushed immediately with an atomic tmp+rename.
pub struct JsonStore {
    base_dir: PathBuf,
    data: LocalStorageData,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quillsheet");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        let mut store = Self {
            base_dir,
            data: LocalStorageData::default(),
        };
        let data: LocalStorageData = store.load(LOCAL_STORAGE_FILE);
        if data.needs_reset() {
            log::warn!(
                "local storage schema {} is not supported, starting empty",
                data.schema_version
            );
        } else {
            store.data = data;
        }
        Ok(store)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let path = self.file_path(name);
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    log::warn!("ignoring unreadable {}: {e}", path.display());
                    T::default()
                }),
                Err(_) => T::default(),
            }
        } else {
            T::default()
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.data.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data.items.insert(key.to_string(), value.to_string());
        self.save(LOCAL_STORAGE_FILE, &self.data)
            .map_err(|e| StoreError::Persist {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::catalog::Grade;
    use crate::topic::recent::RecentTopicsStore;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_items_survive_reopen() {
        let (dir, mut store) = make_test_store();
        store.set_item("recentTopics_2", r#"["Nouns"]"#).unwrap();

        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            reopened.get_item("recentTopics_2").as_deref(),
            Some(r#"["Nouns"]"#)
        );
        assert_eq!(reopened.read(Grade(2)), vec!["Nouns".to_string()]);
    }

    #[test]
    fn test_no_tmp_files_after_write() {
        let (dir, mut store) = make_test_store();
        store.write(Grade(4), &["Homophones".to_string()]).unwrap();

        let tmp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");
        assert!(store.file_path(LOCAL_STORAGE_FILE).exists());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCAL_STORAGE_FILE), "{{{").unwrap();

        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.get_item("recentTopics_2").is_none());
    }

    #[test]
    fn test_stale_schema_is_discarded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(LOCAL_STORAGE_FILE),
            r#"{"schema_version": 99, "items": {"recentTopics_2": "[\"Nouns\"]"}}"#,
        )
        .unwrap();

        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.read(Grade(2)).is_empty());
    }

    #[test]
    fn test_malformed_value_reads_as_no_recent_topics() {
        let (_dir, mut store) = make_test_store();
        store.set_item("recentTopics_3", "not json").unwrap();
        assert!(store.read(Grade(3)).is_empty());
    }

    #[test]
    fn test_write_failure_is_reported_not_panicked() {
        let (dir, mut store) = make_test_store();
        // Point the store at a directory that no longer exists.
        let gone = dir.path().join("gone");
        store.base_dir = gone;

        let result = store.set_item("recentTopics_2", "[]");
        assert!(matches!(result, Err(StoreError::Persist { .. })));
        // The in-memory value is still served.
        assert_eq!(store.get_item("recentTopics_2").as_deref(), Some("[]"));
    }
}
