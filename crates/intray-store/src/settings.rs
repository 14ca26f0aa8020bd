use std::path::{Path, PathBuf};

use anyhow::Context;
use intray_core::{SettingsDto, SettingsStore};

use crate::{lock_file, lock_path_for, write_atomic};

/// Settings blob stored as pretty-printed JSON.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    /// A missing file is `None`. An unparseable one is logged and treated
    /// the same, so a corrupt file falls back to defaults.
    fn load(&self) -> anyhow::Result<Option<SettingsDto>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", self.path.display()))
            }
        };
        match serde_json::from_str(&content) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "settings file is not valid JSON, using defaults"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, settings: &SettingsDto) -> anyhow::Result<()> {
        let _lock = lock_file(&lock_path_for(&self.path))?;
        let json = serde_json::to_string_pretty(settings)?;
        write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("cannot write {}", self.path.display()))
    }
}
