use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::store::{SettingsError, SettingsStore};

/// Flat JSON object on disk, e.g. `{"aiAdviceEnabled":true}`.
///
/// A missing file reads as an empty object. Every save rewrites the file.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, bool>, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self, key: &str) -> Result<Option<bool>, SettingsError> {
        Ok(self.read_all()?.get(key).copied())
    }

    fn save(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        let _guard = self.write_lock.lock().map_err(|_| SettingsError::Poisoned)?;
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);
        fs::write(&self.path, serde_json::to_vec_pretty(&all)?)?;
        Ok(())
    }
}
