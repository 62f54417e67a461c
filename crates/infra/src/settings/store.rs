use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("settings store lock poisoned")]
    Poisoned,
}

/// Key/value persistence for boolean preferences.
pub trait SettingsStore: Send + Sync {
    /// `Ok(None)` when the key was never written.
    fn load(&self, key: &str) -> Result<Option<bool>, SettingsError>;

    fn save(&self, key: &str, value: bool) -> Result<(), SettingsError>;
}

impl<S> SettingsStore for Arc<S>
where
    S: SettingsStore + ?Sized,
{
    fn load(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        (**self).save(key, value)
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    inner: RwLock<HashMap<String, bool>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        let map = self.inner.read().map_err(|_| SettingsError::Poisoned)?;
        Ok(map.get(key).copied())
    }

    fn save(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        let mut map = self.inner.write().map_err(|_| SettingsError::Poisoned)?;
        map.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_loads_as_none() {
        let store = InMemorySettingsStore::new();
        assert_eq!(store.load("aiAdviceEnabled").unwrap(), None);
    }

    #[test]
    fn save_then_load_through_arc() {
        let store = Arc::new(InMemorySettingsStore::new());
        store.save("aiChatbotEnabled", false).unwrap();
        assert_eq!(store.load("aiChatbotEnabled").unwrap(), Some(false));
    }
}
