use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::store::{SettingsError, SettingsStore};
use super::{ADVICE_ENABLED_KEY, CHATBOT_ENABLED_KEY};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub advice_enabled: bool,
    pub chatbot_enabled: bool,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            advice_enabled: true,
            chatbot_enabled: true,
        }
    }
}

/// Current preferences plus the store they are written through to.
pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
    current: RwLock<AiSettings>,
}

impl SettingsService {
    /// Loads both flags once. Unset or unreadable flags default to `true`.
    pub fn load(store: Arc<dyn SettingsStore>) -> Self {
        let defaults = AiSettings::default();
        let current = AiSettings {
            advice_enabled: read_flag(store.as_ref(), ADVICE_ENABLED_KEY, defaults.advice_enabled),
            chatbot_enabled: read_flag(
                store.as_ref(),
                CHATBOT_ENABLED_KEY,
                defaults.chatbot_enabled,
            ),
        };
        Self {
            store,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> AiSettings {
        self.current.read().map(|s| *s).unwrap_or_default()
    }

    pub fn set_advice_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        self.update(ADVICE_ENABLED_KEY, enabled, |s| s.advice_enabled = enabled)
    }

    pub fn set_chatbot_enabled(&self, enabled: bool) -> Result<(), SettingsError> {
        self.update(CHATBOT_ENABLED_KEY, enabled, |s| s.chatbot_enabled = enabled)
    }

    /// Persist first so memory never runs ahead of the store.
    fn update<F>(&self, key: &str, value: bool, apply: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&mut AiSettings),
    {
        self.store.save(key, value)?;
        let mut current = self.current.write().map_err(|_| SettingsError::Poisoned)?;
        apply(&mut current);
        info!(key, value, "setting changed");
        Ok(())
    }
}

impl core::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SettingsService")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

fn read_flag(store: &dyn SettingsStore, key: &str, default: bool) -> bool {
    match store.load(key) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(error) => {
            warn!(key, %error, "could not read setting, using default");
            default
        }
    }
}
