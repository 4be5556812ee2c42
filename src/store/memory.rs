use super::DocumentStore;
use crate::error::PersistenceError;
use std::sync::Mutex;

/// Process-local store. Nothing survives a restart.
pub struct MemoryStore<T> {
    document: Mutex<Option<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            document: Mutex::new(None),
        }
    }

    pub fn with_document(document: T) -> Self {
        Self {
            document: Mutex::new(Some(document)),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DocumentStore<T> for MemoryStore<T> where T: Clone + Default + Send {
    fn load(&self) -> Result<T, PersistenceError> {
        let guard = self.document.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.clone().unwrap_or_default())
    }

    fn save(&self, document: &T) -> Result<(), PersistenceError> {
        let mut guard = self.document.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(document.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
