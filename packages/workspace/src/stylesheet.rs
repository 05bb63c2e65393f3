//! Page stylesheet generated from [`GlobalStyles`]
//!
//! Typography and branding become custom properties on `:root`; string
//! values in the custom style scope are appended verbatim, in key order.

use pagewright_document::GlobalStyles;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::Path;

pub fn generate(styles: &GlobalStyles) -> String {
    let mut css = String::new();

    let mut root = styles.custom_properties();
    if let Some(scheme) = &styles.color_scheme {
        root.insert("color-scheme".to_string(), scheme.clone());
    }

    if !root.is_empty() {
        css.push_str(":root {\n");
        for (property, value) in &root {
            let _ = writeln!(css, "  {}: {};", property, value);
        }
        css.push_str("}\n");
    }

    for (key, value) in &styles.custom_style {
        match value {
            Value::String(raw) if !raw.trim().is_empty() => {
                if !css.is_empty() {
                    css.push('\n');
                }
                css.push_str(raw.trim_end());
                css.push('\n');
            }
            Value::String(_) => {}
            _ => tracing::debug!(key, "skipping non-string custom style"),
        }
    }

    css
}

/// Write the stylesheet, creating parent directories as needed
pub fn write(path: &Path, styles: &GlobalStyles) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate(styles))
}
