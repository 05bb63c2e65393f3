//! Persistence boundary used by the save flow

use pagewright_bridge::BarrierOutcome;
use pagewright_document::{GlobalStyles, Section};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings data: {0}")]
    Format(#[from] serde_json::Error),
}

/// Everything a save persists
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSettings {
    #[serde(default)]
    pub sections: Vec<Section>,

    #[serde(default)]
    pub styles: GlobalStyles,
}

/// Where saved settings live
pub trait SettingsStore: Send + Sync {
    /// Last saved settings, or the empty default when nothing was saved yet
    fn load(&self) -> Result<SavedSettings, StoreError>;

    /// Overwrite the saved settings
    fn save(&self, settings: &SavedSettings) -> Result<(), StoreError>;

    /// Regenerate the page stylesheet. Returns where it was written, if anywhere.
    fn regenerate_stylesheet(&self, _styles: &GlobalStyles) -> Result<Option<PathBuf>, StoreError> {
        Ok(None)
    }
}

/// Result of one save
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    /// Whether the preview confirmed it flushed inline edits in time
    pub flush: BarrierOutcome,
    pub revision: u64,
    pub sections: usize,
    pub stylesheet: Option<PathBuf>,
}

/// Store kept in memory, for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    saved: Option<SavedSettings>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SavedSettings) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                saved: Some(settings),
                saves: 0,
            }),
        }
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    // Writes are whole-value assignments; a poisoned lock still holds consistent data
    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<SavedSettings, StoreError> {
        Ok(self.lock().saved.clone().unwrap_or_default())
    }

    fn save(&self, settings: &SavedSettings) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.saved = Some(settings.clone());
        inner.saves += 1;
        Ok(())
    }
}
