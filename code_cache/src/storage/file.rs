use super::KeyValueStorage;
use crate::error::StorageError;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

/// A JSON object on disk holding every key/value pair.
///
/// The whole file is rewritten through a temp file and an atomic rename on
/// each mutation, so a crash mid-write leaves the previous file intact. If
/// persisting fails the in-memory view is rolled back as well.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens `path`, creating parent directories. A missing file is an empty
    /// store; an unreadable or non-JSON file is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        util::paths::ensure_parent_dir(&path)?;

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "Opened cache file");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("file storage lock poisoned".into()))
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, entries)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }

    /// Applies `mutate`, persists, and undoes the change if persisting fails.
    fn mutate(
        &self,
        key: &str,
        mutate: impl FnOnce(&mut BTreeMap<String, String>) -> Option<String>,
    ) -> Result<(), StorageError> {
        let mut entries = self.lock()?;
        let previous = mutate(&mut entries);

        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(old) => {
                    entries.insert(key.to_string(), old);
                }
                None => {
                    entries.remove(key);
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(key, |entries| entries.insert(key.to_string(), value.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.lock()?.contains_key(key) {
            return Ok(());
        }
        self.mutate(key, |entries| entries.remove(key))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("drafts").join("cache.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("a", "print('hi')").unwrap();
        storage.set("b", "fn main() {}").unwrap();
        storage.remove("b").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("print('hi')"));
        assert_eq!(reopened.get("b").unwrap(), None);
        assert_eq!(reopened.keys().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn empty_file_opens_as_empty_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(&path, "").unwrap();
        assert!(FileStorage::open(&path).unwrap().keys().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache.json");
        std::fs::write(&path, "[1,2").unwrap();
        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn failed_persist_keeps_previous_value() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sub").join("cache.json");
        let storage = FileStorage::open(&path).unwrap();
        storage.set("k", "old").unwrap();

        // Removing the directory makes the temp file creation fail.
        std::fs::remove_dir_all(tmp.path().join("sub")).unwrap();
        assert!(storage.set("k", "new").is_err());
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("old"));
    }
}
