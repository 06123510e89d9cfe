// Config store: a flat JSON object persisted to a single file.
//
// The whole object is rewritten on every mutation, there is no partial
// patching and no file locking. One `ConfigStore` is built per process and
// handed by reference to whatever needs it.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const USERNAME: &str = "username";
pub const PASSWORD: &str = "password";
pub const API_KEY: &str = "api_key";
/// Cached machine catalog.
pub const MACHINES: &str = "machines";

const FILE_NAME: &str = "config.json";

/// Default location of the config file. An existing `config.json` in the
/// working directory wins; otherwise `<config dir>/hackmycli/config.json`,
/// or the working-directory file when the platform has no config directory.
pub fn default_path() -> PathBuf {
    pick_default(Path::new(FILE_NAME), dirs::config_dir())
}

fn pick_default(local: &Path, config_dir: Option<PathBuf>) -> PathBuf {
    if local.is_file() {
        return local.to_path_buf();
    }
    match config_dir {
        Some(dir) => dir.join("hackmycli").join(FILE_NAME),
        None => local.to_path_buf(),
    }
}

/// In-memory mirror of the config file.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl ConfigStore {
    /// Load the store from `path`. A missing or empty file gives an empty
    /// store; nothing is written until the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "loaded config store");
        Ok(ConfigStore { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Like `get`, but only for string values.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Insert or overwrite `key`, then persist.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.into());
        self.commit(next)?;
        info!(key, "config key saved");
        Ok(())
    }

    /// Remove `key`, then persist. Fails with `KeywordNotFound` when the key
    /// is absent.
    pub fn remove(&mut self, key: &str) -> Result<Value> {
        let mut next = self.entries.clone();
        let value = next
            .remove(key)
            .ok_or_else(|| Error::KeywordNotFound(key.to_string()))?;
        self.commit(next)?;
        info!(key, "config key removed");
        Ok(value)
    }

    /// Drop every entry, then persist.
    pub fn clear(&mut self) -> Result<()> {
        self.commit(Map::new())?;
        info!("config store cleared");
        Ok(())
    }

    /// Memory only changes once `next` is on disk.
    fn commit(&mut self, next: Map<String, Value>) -> Result<()> {
        self.write(&next)?;
        self.entries = next;
        Ok(())
    }

    /// Write the full state to the backing file.
    pub fn persist(&self) -> Result<()> {
        self.write(&self.entries)
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "config store persisted");
        Ok(())
    }
}
