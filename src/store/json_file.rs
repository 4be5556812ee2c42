use super::DocumentStore;
use crate::error::PersistenceError;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{ self, File };
use std::io::{ ErrorKind, Write };
use std::marker::PhantomData;
use std::path::PathBuf;

/// JSON document on disk, replaced atomically on every save.
///
/// Writes go to a hidden sibling (`.<name>.tmp`), are fsynced, then renamed
/// over the target, so a reader never observes a truncated file.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }

    fn write_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl<T> DocumentStore<T> for JsonFileStore<T> where T: Serialize + DeserializeOwned + Default {
    fn load(&self) -> Result<T, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(T::default());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&content).map_err(|source| PersistenceError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, document: &T) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(document)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
            }
        }

        let tmp_path = self.temp_path();
        let mut tmp_file = File::create(&tmp_path).map_err(|e| self.write_error(e))?;
        tmp_file.write_all(json.as_bytes()).map_err(|e| self.write_error(e))?;
        tmp_file.sync_all().map_err(|e| self.write_error(e))?;
        drop(tmp_file);

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.write_error(e));
        }

        debug!("Saved {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ Chat, ConversationDocument, CredentialDocument, UserChats };
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::<CredentialDocument>::new(dir.path().join("users.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn blank_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chats.json");
        fs::write(&path, "  \n").unwrap();
        let store = JsonFileStore::<ConversationDocument>::new(path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error_and_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chats.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::<ConversationDocument>::new(&path);

        let err = store.load().unwrap_err();
        assert!(matches!(err, PersistenceError::Malformed { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn save_leaves_no_temp_file_and_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("chats.json");
        let store = JsonFileStore::<ConversationDocument>::new(&path);

        let mut doc = ConversationDocument::new();
        let mut chats = UserChats::new();
        chats.insert("c1".to_string(), Chat::new("New Chat"));
        doc.insert("alice".to_string(), chats);
        store.save(&doc).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join(".chats.json.tmp").exists());
        let loaded = store.load().unwrap();
        assert_eq!(loaded["alice"]["c1"].title(), "New Chat");
    }

    #[test]
    fn save_of_load_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chats.json");
        let store = JsonFileStore::<ConversationDocument>::new(&path);

        let mut doc = ConversationDocument::new();
        let mut chats = UserChats::new();
        chats.insert("b".to_string(), Chat::new("second"));
        chats.insert("a".to_string(), Chat::new("first"));
        doc.insert("alice".to_string(), chats);
        store.save(&doc).unwrap();
        let first = fs::read(&path).unwrap();

        let reloaded = store.load().unwrap();
        store.save(&reloaded).unwrap();
        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn unwritable_target_surfaces_write_error() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the file makes the final rename fail.
        let path = dir.path().join("chats.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();
        let store = JsonFileStore::<ConversationDocument>::new(&path);

        let err = store.save(&ConversationDocument::new()).unwrap_err();
        assert!(matches!(err, PersistenceError::Write { .. }));
        assert!(!dir.path().join(".chats.json.tmp").exists());
    }
}
