use backoffice_error::StateError;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key-value backend the stores persist into. One entry per store key,
/// the contents are an opaque serialized object.
pub trait StateStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StateError>;

    fn save(&self, key: &str, contents: &str) -> Result<(), StateError>;

    fn remove(&self, key: &str) -> Result<(), StateError>;
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StateError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::Io(format!(
                "Failed to read state for {}: {}",
                key, e
            ))),
        }
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), StateError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            StateError::Io(format!(
                "Failed to create state directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        // write then rename so a crash never leaves a half written entry
        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!(".{}.json.tmp", key));

        fs::write(&tmp_path, contents)
            .map_err(|e| StateError::Io(format!("Failed to write state for {}: {}", key, e)))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| StateError::Io(format!("Failed to write state for {}: {}", key, e)))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::Io(format!(
                "Failed to remove state for {}: {}",
                key, e
            ))),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), StateError> {
        self.entries().insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("state"));

        assert_eq!(storage.load("users").unwrap(), None);

        storage.save("users", r#"{"page": 2}"#).unwrap();
        assert_eq!(storage.load("users").unwrap().unwrap(), r#"{"page": 2}"#);
        assert!(dir.path().join("state").join("users.json").exists());

        storage.save("users", r#"{"page": 3}"#).unwrap();
        assert_eq!(storage.load("users").unwrap().unwrap(), r#"{"page": 3}"#);

        storage.remove("users").unwrap();
        assert_eq!(storage.load("users").unwrap(), None);
        // removing twice is fine
        storage.remove("users").unwrap();
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.save("charts", "{}").unwrap();
        assert_eq!(storage.load("charts").unwrap().as_deref(), Some("{}"));
        storage.remove("charts").unwrap();
        assert_eq!(storage.load("charts").unwrap(), None);
    }
}
