//! Settings kept in one JSON file on disk

use crate::stylesheet;
use pagewright_document::GlobalStyles;
use pagewright_editor::{SavedSettings, SettingsStore, StoreError};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    stylesheet: Option<PathBuf>,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stylesheet: None,
        }
    }

    /// Store `settings.json` inside `data_dir`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(SETTINGS_FILE))
    }

    /// Also regenerate the page stylesheet at `path` on every save
    pub fn with_stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.stylesheet = Some(path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stylesheet_path(&self) -> Option<&Path> {
        self.stylesheet.as_deref()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<SavedSettings, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(SavedSettings::default()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved settings yet");
                Ok(SavedSettings::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, settings: &SavedSettings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Readers only ever see a complete file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(settings)?)?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), sections = settings.sections.len(), "settings written");
        Ok(())
    }

    fn regenerate_stylesheet(&self, styles: &GlobalStyles) -> Result<Option<PathBuf>, StoreError> {
        match &self.stylesheet {
            Some(path) => {
                stylesheet::write(path, styles)?;
                Ok(Some(path.clone()))
            }
            None => Ok(None),
        }
    }
}
