use crate::section::Settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Settings key in branding updates that selects the active color scheme
pub const COLOR_SCHEME_KEY: &str = "colorScheme";

/// Which group of global styles an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleScope {
    Typography,
    Branding,
    CustomStyle,
}

impl StyleScope {
    pub fn name(&self) -> &'static str {
        match self {
            StyleScope::Typography => "typography",
            StyleScope::Branding => "branding",
            StyleScope::CustomStyle => "custom-style",
        }
    }
}

/// Page-wide style settings
///
/// The active color scheme is an explicit field here and travels with every
/// save; nothing reads it from shared mutable state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStyles {
    #[serde(default)]
    pub typography: Settings,

    #[serde(default)]
    pub branding: Settings,

    #[serde(default)]
    pub custom_style: Settings,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
}

impl GlobalStyles {
    pub fn scope(&self, scope: StyleScope) -> &Settings {
        match scope {
            StyleScope::Typography => &self.typography,
            StyleScope::Branding => &self.branding,
            StyleScope::CustomStyle => &self.custom_style,
        }
    }

    /// Merge an update into one scope. Returns whether anything changed.
    pub fn merge(&mut self, scope: StyleScope, settings: &Settings) -> bool {
        let target = match scope {
            StyleScope::Typography => &mut self.typography,
            StyleScope::Branding => &mut self.branding,
            StyleScope::CustomStyle => &mut self.custom_style,
        };

        let mut changed = false;
        for (key, value) in settings {
            if target.get(key) != Some(value) {
                target.insert(key.clone(), value.clone());
                changed = true;
            }
        }

        if scope == StyleScope::Branding {
            if let Some(Value::String(scheme)) = settings.get(COLOR_SCHEME_KEY) {
                if self.color_scheme.as_deref() != Some(scheme.as_str()) {
                    self.color_scheme = Some(scheme.clone());
                    changed = true;
                }
            }
        }

        changed
    }

    /// CSS custom properties for the typography and branding scopes
    ///
    /// `{"fontFamily": "Inter"}` under typography becomes
    /// `--typography-font-family: Inter`. Custom style settings are raw CSS
    /// and are not turned into properties.
    pub fn custom_properties(&self) -> BTreeMap<String, String> {
        let mut properties = BTreeMap::new();

        for scope in [StyleScope::Typography, StyleScope::Branding] {
            for (key, value) in self.scope(scope) {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => continue,
                    other => other.to_string(),
                };
                properties.insert(format!("--{}-{}", scope.name(), kebab_case(key)), value);
            }
        }

        properties
    }
}

fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '_' || c == ' ' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}
