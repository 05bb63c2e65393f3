use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_editor::{SavedSettings, SettingsStore};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Port the workspace server listens on
    #[arg(short, long, default_value_t = 4000)]
    pub port: u16,

    /// Directory for saved settings
    #[arg(short, long, default_value = "data")]
    pub data_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagewright site...".bright_blue().bold());

    let config = Config {
        port: args.port,
        data_dir: args.data_dir,
        ..Config::default()
    };

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let media_dir = cwd.join(&config.media_dir);
    if !media_dir.exists() {
        fs::create_dir_all(&media_dir)?;
        println!("  {} Created {}/", "✓".green(), config.media_dir);
    }

    let store = config.settings_store(cwd);
    if !store.path().exists() {
        store.save(&SavedSettings::default())?;
        println!("  {} Created {}", "✓".green(), store.path().display());
    }

    println!();
    println!("{}", "✅ Site initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagewright catalog");
    println!("  2. Run: pagewright serve");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_empty_settings() {
        let dir = tempfile::tempdir().unwrap();

        init(
            InitArgs {
                port: 5050,
                data_dir: "content".to_string(),
                force: false,
            },
            dir.path(),
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.port, 5050);
        assert!(dir.path().join("content/settings.json").exists());
        assert!(dir.path().join("public/media").is_dir());
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "port": 9000 }"#).unwrap();

        init(
            InitArgs {
                port: 5050,
                data_dir: "data".to_string(),
                force: false,
            },
            dir.path(),
        )
        .unwrap();

        assert_eq!(Config::load(dir.path()).unwrap().port, 9000);
    }
}
