//! Durable key/value slots backing the database snapshot and the session.
//!
//! Every write replaces the whole value of a key; there is no partial update and
//! no history of previous values.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use crate::error::AppError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// One file per key inside a directory. Writes go through a temp file in the same
/// directory and are renamed into place, so readers never see a torn value.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(file_name_for(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir)?;
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(value.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(self.path_for(key))
            .map_err(|err| AppError::Io(err.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(lock_values(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        lock_values(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        lock_values(&self.values).remove(key);
        Ok(())
    }
}

fn lock_values(
    values: &Mutex<HashMap<String, String>>,
) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
    // A panic while holding the lock cannot leave a half-written entry.
    values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn file_name_for(key: &str) -> String {
    let sanitized: String = key
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    format!("{sanitized}.store")
}

pub fn ensure_dir(path: &Path) -> Result<(), AppError> {
    fs::create_dir_all(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_store_round_trips_and_overwrites() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("party-planner-db").expect("get"), None);

        store.set("party-planner-db", "[1,2,3]").expect("set");
        store.set("party-planner-db", "[4]").expect("overwrite");
        assert_eq!(
            store.get("party-planner-db").expect("get").as_deref(),
            Some("[4]")
        );

        store.remove("party-planner-db").expect("remove");
        store.remove("party-planner-db").expect("remove twice");
        assert_eq!(store.get("party-planner-db").expect("get"), None);
    }

    #[test]
    fn file_store_sanitizes_key_names() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::new(dir.path());
        let path = store.path_for("../escape/key");
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn memory_store_keeps_last_value() {
        let store = MemoryStore::new();
        store.set("selected-party-id", "4").expect("set");
        store.set("selected-party-id", "7").expect("set");
        assert_eq!(
            store.get("selected-party-id").expect("get").as_deref(),
            Some("7")
        );
        store.remove("selected-party-id").expect("remove");
        assert_eq!(store.get("selected-party-id").expect("get"), None);
    }
}
