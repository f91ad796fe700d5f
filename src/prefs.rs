use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::PreferenceError;

pub const UI_LANGUAGE: &str = "ui.language";
pub const SOCIAL_LANGUAGE: &str = "social.language";
pub const MAKER_WORLD_LANGUAGE: &str = "makerworld.language";

pub const DEFAULT_LANGUAGE: &str = "en";

/// Flat key-value store for user preferences, persisted as a single JSON
/// object. Values are opaque scalars under fixed string keys; there is no
/// schema versioning. A missing or unreadable file behaves as empty.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl PreferenceStore {
    /// Store that never touches disk, for tests and the demo binary.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Reads the preference file once at startup.
    pub fn load(path: PathBuf) -> Self {
        let values = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Ignoring malformed preference file {:?}: {}", path, e);
                    Map::new()
                }
            },
            Err(_) => Map::new(),
        };
        Self {
            path: Some(path),
            values,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn language(&self, key: &str) -> &str {
        self.get_str(key).unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Stores `value` and writes the whole object back out immediately.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    fn persist(&self) -> Result<(), PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string_pretty(&self.values)
            .map_err(|e| PreferenceError::Write(e.to_string()))?;
        fs::write(path, raw).map_err(|e| PreferenceError::Write(e.to_string()))
    }
}
