use std::path::PathBuf;

use serde::Deserialize;

use crate::error::StudioError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Bounded depth of the undo stack; the oldest entry is evicted first.
    pub history_limit: usize,
    /// Minimum number of uploaded images a collage request needs.
    pub collage_min_images: usize,
    /// Where user preferences are persisted. `None` keeps them in memory.
    pub preferences_path: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            history_limit: 20,
            collage_min_images: 2,
            preferences_path: None,
        }
    }
}

impl Configuration {
    /// Layers `PHOTOSTUDIO_*` environment overrides on top of the defaults,
    /// e.g. `PHOTOSTUDIO_HISTORY_LIMIT=50`.
    pub fn load() -> Result<Self, StudioError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("PHOTOSTUDIO").try_parsing(true))
            .build()
            .and_then(|raw| raw.try_deserialize::<Configuration>())
            .map_err(|e| StudioError::Configuration(e.to_string()))
    }
}
