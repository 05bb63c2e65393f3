use pagewright_workspace::{FileSettingsStore, MediaLibrary, DEFAULT_ALLOWED_MIME_TYPES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "pagewright.config.json";

/// Pagewright configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Directory holding `settings.json`
    pub data_dir: String,

    /// Where uploads are stored and served from
    pub media_dir: String,

    /// Regenerated on every save; no stylesheet when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet_path: Option<String>,

    pub port: u16,

    pub allowed_mime_types: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            media_dir: "public/media".to_string(),
            stylesheet_path: Some("public/theme.css".to_string()),
            port: 4000,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load config from a directory; defaults when there is no config file
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn data_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.data_dir)
    }

    pub fn settings_store(&self, cwd: &Path) -> FileSettingsStore {
        let store = FileSettingsStore::in_dir(self.data_dir(cwd));
        match &self.stylesheet_path {
            Some(path) => store.with_stylesheet(cwd.join(path)),
            None => store,
        }
    }

    pub fn media_library(&self, cwd: &Path) -> MediaLibrary {
        MediaLibrary::new(cwd.join(&self.media_dir))
            .with_allowed_types(self.allowed_mime_types.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "dataDir": "site/data",
            "mediaDir": "site/uploads",
            "port": 8080,
            "allowedMimeTypes": ["image/png"]
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.data_dir, "site/data");
        assert_eq!(config.media_dir, "site/uploads");
        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_mime_types, vec!["image/png"]);
        // missing keys keep their defaults
        assert_eq!(config.stylesheet_path.as_deref(), Some("public/theme.css"));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 4000);
        assert_eq!(config.allowed_mime_types.len(), 6);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_paths_resolve_against_cwd() {
        let config = Config {
            stylesheet_path: None,
            ..Config::default()
        };
        let cwd = Path::new("/srv/site");

        let store = config.settings_store(cwd);
        assert_eq!(store.path(), Path::new("/srv/site/data/settings.json"));
        assert_eq!(store.stylesheet_path(), None);
        assert_eq!(config.media_library(cwd).dir(), Path::new("/srv/site/public/media"));
    }
}
