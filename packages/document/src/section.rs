//! # Sections
//!
//! A [`Document`] is an ordered list of [`Section`]s. Order is render order.
//!
//! Settings live behind an `Arc` so that cloning a document for a new history
//! snapshot shares every section the command did not touch. Writers go through
//! `Arc::make_mut`, which copies only the map being edited.

use crate::VISIBILITY_KEY;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Per-instance settings. Key order carries no meaning.
pub type Settings = BTreeMap<String, Value>;

/// Opaque, stable section identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Section kind tag, resolved against the section registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionType(String);

impl SectionType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionType {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl From<String> for SectionType {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// One addressable, typed block of page content
///
/// On the way in, the `isVisible` flag and a boolean `settings.isVisible`
/// are made to agree. An explicit flag wins; without one the setting decides,
/// and a section with neither is visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireSection")]
pub struct Section {
    pub id: SectionId,

    #[serde(rename = "type")]
    pub section_type: SectionType,

    pub settings: Arc<Settings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,

    pub is_visible: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSection {
    id: SectionId,
    #[serde(rename = "type")]
    section_type: SectionType,
    #[serde(default)]
    settings: Arc<Settings>,
    #[serde(default)]
    content: Option<Value>,
    is_visible: Option<bool>,
}

impl From<WireSection> for Section {
    fn from(wire: WireSection) -> Self {
        let setting = match wire.settings.get(VISIBILITY_KEY) {
            Some(Value::Bool(visible)) => Some(*visible),
            _ => None,
        };

        let mut section = Section {
            id: wire.id,
            section_type: wire.section_type,
            settings: wire.settings,
            content: wire.content,
            is_visible: wire.is_visible.or(setting).unwrap_or(true),
        };

        if setting.is_some_and(|visible| visible != section.is_visible) {
            let visible = section.is_visible;
            section
                .settings_mut()
                .insert(VISIBILITY_KEY.to_string(), Value::Bool(visible));
        }

        section
    }
}

impl Section {
    pub fn new(id: impl Into<SectionId>, section_type: impl Into<SectionType>) -> Self {
        Self {
            id: id.into(),
            section_type: section_type.into(),
            settings: Arc::new(Settings::new()),
            content: None,
            is_visible: true,
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Arc::make_mut(&mut self.settings).insert(key.into(), value.into());
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn with_content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Mutable settings, copying the map first if a snapshot still shares it
    pub fn settings_mut(&mut self) -> &mut Settings {
        Arc::make_mut(&mut self.settings)
    }
}

/// Ordered sequence of sections
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Build a document keeping only the first section for each id
    pub fn deduplicated(sections: impl IntoIterator<Item = Section>) -> Self {
        let mut seen = HashSet::new();
        let mut dropped = 0;
        let sections = sections
            .into_iter()
            .filter(|s| {
                let first = seen.insert(s.id.clone());
                dropped += usize::from(!first);
                first
            })
            .collect();

        if dropped > 0 {
            tracing::warn!(dropped, "repeated section ids dropped");
        }

        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn get(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn position(&self, id: &SectionId) -> Option<usize> {
        self.sections.iter().position(|s| &s.id == id)
    }

    pub fn contains(&self, id: &SectionId) -> bool {
        self.position(id).is_some()
    }

    /// Section ids in render order
    pub fn ids(&self) -> Vec<&SectionId> {
        self.sections.iter().map(|s| &s.id).collect()
    }

    pub(crate) fn sections_mut(&mut self) -> &mut Vec<Section> {
        &mut self.sections
    }

    pub(crate) fn get_mut(&mut self, id: &SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| &s.id == id)
    }
}

impl FromIterator<Section> for Document {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_wire_format() {
        let section = Section::new("s1", "hero").with_setting("title", "Hi");
        let json = serde_json::to_value(&section).unwrap();

        assert_eq!(
            json,
            json!({
                "id": "s1",
                "type": "hero",
                "settings": { "title": "Hi" },
                "isVisible": true
            })
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let section: Section = serde_json::from_value(json!({ "id": "s1", "type": "text" })).unwrap();

        assert!(section.is_visible);
        assert!(section.settings.is_empty());
        assert_eq!(section.content, None);
    }

    #[test]
    fn test_visibility_setting_hides_section_without_flag() {
        let section: Section = serde_json::from_value(json!({
            "id": "s1",
            "type": "text",
            "settings": { "isVisible": false }
        }))
        .unwrap();

        assert!(!section.is_visible);
        assert_eq!(section.setting(VISIBILITY_KEY), Some(&json!(false)));
    }

    #[test]
    fn test_visibility_flag_overrides_stale_setting() {
        let section: Section = serde_json::from_value(json!({
            "id": "s1",
            "type": "text",
            "settings": { "isVisible": false, "body": "x" },
            "isVisible": true
        }))
        .unwrap();

        assert!(section.is_visible);
        assert_eq!(section.setting(VISIBILITY_KEY), Some(&json!(true)));
        assert_eq!(section.setting("body"), Some(&json!("x")));
    }

    #[test]
    fn test_deduplicated_keeps_first_occurrence() {
        let document = Document::deduplicated(vec![
            Section::new("a", "hero"),
            Section::new("b", "text"),
            Section::new("a", "text"),
        ]);

        assert_eq!(document.ids(), vec![&SectionId::from("a"), &SectionId::from("b")]);
        assert_eq!(document.sections()[0].section_type.as_str(), "hero");
    }

    #[test]
    fn test_cloned_sections_share_settings_until_written() {
        let original = Section::new("s1", "hero").with_setting("title", "Old");
        let mut copy = original.clone();
        assert!(Arc::ptr_eq(&original.settings, &copy.settings));

        copy.settings_mut().insert("title".into(), json!("New"));
        assert!(!Arc::ptr_eq(&original.settings, &copy.settings));
        assert_eq!(original.setting("title"), Some(&json!("Old")));
    }

    #[test]
    fn test_document_lookup() {
        let doc: Document = vec![Section::new("a", "hero"), Section::new("b", "text")]
            .into_iter()
            .collect();

        assert_eq!(doc.position(&"b".into()), Some(1));
        assert!(doc.get(&"missing".into()).is_none());
        assert_eq!(doc.ids(), vec![&SectionId::from("a"), &SectionId::from("b")]);
    }
}
