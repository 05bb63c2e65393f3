//! # Schema Resolution
//!
//! A section schema lists content fields and style fields, each with an id,
//! a type tag and a default. Resolution produces one flat props map:
//!
//! ```text
//! value(field) = settings[field.id]   if present and not null
//!              = field.default        otherwise
//! ```
//!
//! Content fields resolve first; a style field with the same id wins.
//! Fields with an unknown or missing type tag still resolve, and are listed
//! in [`Props::unsupported`] so the renderer can show a placeholder for them.

use pagewright_document::Settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Field type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Textarea,
    RichText,
    Number,
    Range,
    Color,
    Image,
    Link,
    Select,
    Toggle,
    Repeater,
    /// Anything else, including a missing tag (empty string)
    Unknown(String),
}

impl FieldType {
    pub fn is_supported(&self) -> bool {
        !matches!(self, FieldType::Unknown(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::RichText => "richtext",
            FieldType::Number => "number",
            FieldType::Range => "range",
            FieldType::Color => "color",
            FieldType::Image => "image",
            FieldType::Link => "link",
            FieldType::Select => "select",
            FieldType::Toggle => "toggle",
            FieldType::Repeater => "repeater",
            FieldType::Unknown(tag) => tag,
        }
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Unknown(String::new())
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "richtext" => FieldType::RichText,
            "number" => FieldType::Number,
            "range" => FieldType::Range,
            "color" => FieldType::Color,
            "image" => FieldType::Image,
            "link" => FieldType::Link,
            "select" => FieldType::Select,
            "toggle" => FieldType::Toggle,
            "repeater" => FieldType::Repeater,
            _ => FieldType::Unknown(tag),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

/// One configurable field of a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub default: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, field_type: FieldType, default: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            field_type,
            default: default.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Static schema of a section type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSchema {
    #[serde(default)]
    pub content_fields: Vec<FieldDescriptor>,

    #[serde(default)]
    pub style_fields: Vec<FieldDescriptor>,
}

impl SectionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, field: FieldDescriptor) -> Self {
        self.content_fields.push(field);
        self
    }

    pub fn style(mut self, field: FieldDescriptor) -> Self {
        self.style_fields.push(field);
        self
    }

    /// Content fields followed by style fields
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.content_fields.iter().chain(self.style_fields.iter())
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields().filter(|f| f.id == id).last()
    }
}

/// Field whose type tag the resolver does not know
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsupportedField {
    pub field_id: String,
    pub field_type: String,
}

/// Flat render props for one section instance
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Props {
    values: BTreeMap<String, Value>,
    unsupported: Vec<UnsupportedField>,
}

impl Props {
    pub fn get(&self, field_id: &str) -> Option<&Value> {
        self.values.get(field_id)
    }

    /// String form of a prop, for renderers that only need text
    pub fn get_str(&self, field_id: &str) -> Option<&str> {
        self.values.get(field_id).and_then(Value::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn unsupported(&self) -> &[UnsupportedField] {
        &self.unsupported
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolve a schema against instance settings
pub fn resolve(schema: &SectionSchema, settings: &Settings) -> Props {
    let mut props = Props::default();

    for field in schema.fields() {
        let value = settings
            .get(&field.id)
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| field.default.clone());
        props.values.insert(field.id.clone(), value);

        if !field.field_type.is_supported()
            && !props.unsupported.iter().any(|u| u.field_id == field.id)
        {
            props.unsupported.push(UnsupportedField {
                field_id: field.id.clone(),
                field_type: field.field_type.as_str().to_string(),
            });
        }
    }

    props
}

/// Hit/miss counters for a [`ResolverCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct CacheEntry {
    // Held so the pointers used as the key stay valid
    schema: Arc<SectionSchema>,
    settings: Arc<Settings>,
    props: Arc<Props>,
}

/// Memoizes [`resolve`] on (schema identity, settings identity)
///
/// Identity is `Arc` pointer identity. A section whose settings were not
/// touched by a command keeps the same `Arc` across snapshots, so re-rendering
/// after an unrelated edit hits the cache.
pub struct ResolverCache {
    entries: HashMap<(usize, usize), CacheEntry>,
    capacity: usize,
    stats: CacheStats,
}

impl ResolverCache {
    pub fn new() -> Self {
        Self::with_capacity(512)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            stats: CacheStats::default(),
        }
    }

    pub fn resolve(&mut self, schema: &Arc<SectionSchema>, settings: &Arc<Settings>) -> Arc<Props> {
        let key = (
            Arc::as_ptr(schema) as usize,
            Arc::as_ptr(settings) as usize,
        );

        if let Some(entry) = self.entries.get(&key) {
            if Arc::ptr_eq(&entry.schema, schema) && Arc::ptr_eq(&entry.settings, settings) {
                self.stats.hits += 1;
                return entry.props.clone();
            }
        }

        if self.entries.len() >= self.capacity {
            tracing::debug!(entries = self.entries.len(), "resolver cache full, evicting");
            self.entries.clear();
        }

        self.stats.misses += 1;
        let props = Arc::new(resolve(schema, settings));
        self.entries.insert(
            key,
            CacheEntry {
                schema: schema.clone(),
                settings: settings.clone(),
                props: props.clone(),
            },
        );
        props
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ResolverCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_a() -> SectionSchema {
        SectionSchema::new().content(FieldDescriptor::new("a", FieldType::Text, "X"))
    }

    #[test]
    fn test_default_used_when_setting_missing() {
        let props = resolve(&schema_a(), &Settings::new());
        assert_eq!(props.get("a"), Some(&json!("X")));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn test_setting_overrides_default() {
        let mut settings = Settings::new();
        settings.insert("a".into(), json!("Y"));

        let props = resolve(&schema_a(), &settings);
        assert_eq!(props.get("a"), Some(&json!("Y")));
    }

    #[test]
    fn test_null_setting_falls_back_to_default() {
        let mut settings = Settings::new();
        settings.insert("a".into(), Value::Null);

        assert_eq!(resolve(&schema_a(), &settings).get("a"), Some(&json!("X")));
    }

    #[test]
    fn test_settings_outside_schema_are_ignored() {
        let mut settings = Settings::new();
        settings.insert("stray".into(), json!(1));

        let props = resolve(&schema_a(), &settings);
        assert!(props.get("stray").is_none());
    }

    #[test]
    fn test_style_field_wins_over_content_field() {
        let schema = SectionSchema::new()
            .content(FieldDescriptor::new("align", FieldType::Select, "left"))
            .style(FieldDescriptor::new("align", FieldType::Select, "center"));

        assert_eq!(resolve(&schema, &Settings::new()).get("align"), Some(&json!("center")));
        assert_eq!(schema.field("align").unwrap().default, json!("center"));
    }

    #[test]
    fn test_unknown_field_type_degrades() {
        let schema: SectionSchema = serde_json::from_value(json!({
            "contentFields": [
                { "id": "title", "type": "text", "default": "Hello" },
                { "id": "map", "type": "geo-picker", "default": null },
                { "id": "legacy", "default": 3 }
            ]
        }))
        .unwrap();

        let props = resolve(&schema, &Settings::new());

        assert_eq!(props.get("title"), Some(&json!("Hello")));
        assert_eq!(props.get("legacy"), Some(&json!(3)));
        assert_eq!(
            props.unsupported(),
            &[
                UnsupportedField { field_id: "map".into(), field_type: "geo-picker".into() },
                UnsupportedField { field_id: "legacy".into(), field_type: "".into() },
            ]
        );
    }

    #[test]
    fn test_cache_hits_on_same_identity() {
        let schema = Arc::new(schema_a());
        let settings = Arc::new(Settings::new());
        let mut cache = ResolverCache::new();

        let first = cache.resolve(&schema, &settings);
        let second = cache.resolve(&schema, &settings);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_cache_misses_on_new_settings_identity() {
        let schema = Arc::new(schema_a());
        let mut cache = ResolverCache::new();

        let mut settings = Settings::new();
        settings.insert("a".into(), json!("Y"));
        let first = cache.resolve(&schema, &Arc::new(Settings::new()));
        let second = cache.resolve(&schema, &Arc::new(settings));

        assert_eq!(first.get("a"), Some(&json!("X")));
        assert_eq!(second.get("a"), Some(&json!("Y")));
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_cache_evicts_when_full() {
        let schema = Arc::new(schema_a());
        let mut cache = ResolverCache::with_capacity(2);
        let kept: Vec<_> = (0..3).map(|_| Arc::new(Settings::new())).collect();

        for settings in &kept {
            cache.resolve(&schema, settings);
        }

        assert_eq!(cache.len(), 1);
    }
}
