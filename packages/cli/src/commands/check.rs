use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_document::{Document, BLOCKS_KEY, VISIBILITY_KEY};
use pagewright_editor::{SavedSettings, SettingsStore};
use pagewright_registry::{catalog, resolve, SectionRegistry};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Settings file to check; defaults to the configured data directory
    pub file: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub section_id: String,
    pub message: String,
}

/// Settings keys every section may carry regardless of its schema
const COMMON_KEYS: &[&str] = &[VISIBILITY_KEY, BLOCKS_KEY, "height"];

/// Check every section of a saved document against the registry
pub fn check_document(document: &Document, registry: &SectionRegistry) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen = HashSet::new();

    for section in document.iter() {
        let id = section.id.to_string();

        if !seen.insert(section.id.clone()) {
            findings.push(Finding {
                severity: Severity::Error,
                section_id: id.clone(),
                message: "duplicate section id".to_string(),
            });
        }

        let Some(descriptor) = registry.get(&section.section_type) else {
            findings.push(Finding {
                severity: Severity::Error,
                section_id: id,
                message: format!("Unknown section type: {}", section.section_type),
            });
            continue;
        };

        let props = resolve(&descriptor.schema, &section.settings);
        for field in props.unsupported() {
            findings.push(Finding {
                severity: Severity::Warning,
                section_id: id.clone(),
                message: format!(
                    "Unsupported field type \"{}\" for field {}",
                    field.field_type, field.field_id
                ),
            });
        }

        for key in section.settings.keys() {
            if descriptor.schema.field(key).is_none() && !COMMON_KEYS.contains(&key.as_str()) {
                findings.push(Finding {
                    severity: Severity::Warning,
                    section_id: id.clone(),
                    message: format!("setting \"{}\" is not in the {} schema", key, section.section_type),
                });
            }
        }
    }

    findings
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = match &args.file {
        Some(file) => pagewright_workspace::FileSettingsStore::new(cwd.join(file)),
        None => config.settings_store(cwd),
    };

    println!("🔍 {} {}", "Checking".green().bold(), store.path().display());
    println!();

    let saved: SavedSettings = store.load()?;
    // Raw sections, so repeated ids are still reported
    let document = Document::new(saved.sections);
    let registry = catalog::standard();

    let findings = check_document(&document, &registry);
    for finding in &findings {
        let label = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("  {} [{}] {}", label, finding.section_id.bright_white(), finding.message);
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    let warnings = findings.len() - errors;
    let hidden = document.iter().filter(|s| !s.is_visible).count();

    println!();
    println!("   Sections: {} ({} hidden)", document.len(), hidden);
    if errors > 0 {
        println!("   {} {}", "Errors:".red(), errors);
    }
    if warnings > 0 {
        println!("   {} {}", "Warnings:".yellow(), warnings);
    }

    if errors > 0 || (args.strict && warnings > 0) {
        anyhow::bail!("check failed with {} error(s) and {} warning(s)", errors, warnings);
    }

    println!("✨ {}", "No problems found".green().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagewright_document::Section;

    #[test]
    fn test_unknown_type_is_an_error() {
        let document = Document::new(vec![
            Section::new("s1", "hero").with_setting("title", "Hello"),
            Section::new("s2", "marquee"),
        ]);

        let findings = check_document(&document, &catalog::standard());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].section_id, "s2");
        assert_eq!(findings[0].message, "Unknown section type: marquee");
    }

    #[test]
    fn test_stray_settings_are_warnings() {
        let document = Document::new(vec![Section::new("s1", "text")
            .with_setting("body", "<p>Hi</p>")
            .with_setting("fontWeight", 700)
            .with_setting(VISIBILITY_KEY, true)]);

        let findings = check_document(&document, &catalog::standard());

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0].message.contains("fontWeight"));
    }

    #[test]
    fn test_check_fails_on_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = Config::default().settings_store(dir.path());
        store
            .save(&SavedSettings {
                sections: vec![Section::new("s1", "marquee")],
                ..Default::default()
            })
            .unwrap();

        let args = CheckArgs {
            file: None,
            strict: false,
        };
        assert!(check(args, dir.path()).is_err());
    }

    #[test]
    fn test_check_passes_clean_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"{ "sections": [{ "id": "f", "type": "footer" }] }"#).unwrap();

        let args = CheckArgs {
            file: Some(path),
            strict: true,
        };
        check(args, dir.path()).unwrap();
    }

    #[test]
    fn test_repeated_ids_in_saved_file_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(
            &path,
            r#"{ "sections": [{ "id": "f", "type": "footer" }, { "id": "f", "type": "footer" }] }"#,
        )
        .unwrap();

        let args = CheckArgs {
            file: Some(path),
            strict: false,
        };
        let err = check(args, dir.path()).unwrap_err();
        assert!(err.to_string().contains("1 error(s)"));
    }
}
