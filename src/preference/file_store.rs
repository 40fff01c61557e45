use super::PreferenceStore;
use crate::error::StoreError;
use dirs::config_dir;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use toml::Table;

/// Key/value preferences kept in a small TOML file.
///
/// Every call goes to disk, so values written by another instance are seen on
/// the next read.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// `<config_dir>/backdrop/preferences.toml`, or the working dir if there is no config dir
    pub fn default_path() -> PathBuf {
        config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("backdrop")
            .join("preferences.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<Table, StoreError> {
        if !self.path.exists() {
            return Ok(Table::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(toml::from_str::<Table>(&content)?)
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let table = self.read_table()?;
        Ok(table
            .get(key)
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut table = self.read_table()?;
        table.insert(key.to_string(), toml::Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&table)?)?;

        Ok(())
    }
}
