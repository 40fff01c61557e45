// Preference storage - remembers whether background audio is on or off
// Storage is allowed to be broken; we fall back to "on" and drop writes

pub mod file_store;

pub use file_store::FilePreferenceStore;

use crate::error::{AudioError, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

pub const PREF_ON: &str = "on";
pub const PREF_OFF: &str = "off";

/// Durable string key/value storage (localStorage-shaped)
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-lifetime store, for hosts without durable storage and for tests
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The single on/off flag, encoded as `"on"` / `"off"` under one key.
#[derive(Clone)]
pub struct AudioPreference {
    store: Arc<dyn PreferenceStore>,
    key: String,
}

impl AudioPreference {
    pub fn new(store: Arc<dyn PreferenceStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Read the stored flag. Missing values, unknown values and storage
    /// failures all mean "on"; only an explicit `"off"` disables.
    pub fn load(&self) -> bool {
        match self.store.get(&self.key) {
            Ok(Some(value)) => {
                debug!("Loaded audio preference {}={}", self.key, value);
                value != PREF_OFF
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Failed to load audio preference: {}", AudioError::from(e));
                true
            }
        }
    }

    /// Write the flag, dropping the write if storage refuses it
    pub fn persist(&self, enabled: bool) {
        let value = if enabled { PREF_ON } else { PREF_OFF };
        if let Err(e) = self.store.set(&self.key, value) {
            warn!("Failed to save audio preference: {}", AudioError::from(e));
        }
    }
}

impl std::fmt::Debug for AudioPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPreference")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
