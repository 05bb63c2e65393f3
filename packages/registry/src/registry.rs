use crate::schema::{Props, SectionSchema};
use crate::vdom::VNode;
use pagewright_document::{Section, SectionType};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Turns a section and its resolved props into render nodes
pub trait SectionRenderer: Send + Sync + fmt::Debug {
    fn render(&self, section: &Section, props: &Props) -> VNode;
}

/// Everything the editor and preview need to know about one section type
#[derive(Debug, Clone)]
pub struct SectionDescriptor {
    pub section_type: SectionType,
    pub display_name: String,
    pub group: String,
    pub renderer: Arc<dyn SectionRenderer>,
    pub schema: Arc<SectionSchema>,
    /// Thumbnail shown in the "add section" catalog
    pub placeholder: String,
}

impl SectionDescriptor {
    pub fn new(
        section_type: impl Into<SectionType>,
        display_name: impl Into<String>,
        group: impl Into<String>,
        renderer: Arc<dyn SectionRenderer>,
    ) -> Self {
        let section_type = section_type.into();
        let placeholder = format!("placeholders/{}.png", section_type);
        Self {
            section_type,
            display_name: display_name.into(),
            group: group.into(),
            renderer,
            schema: Arc::new(SectionSchema::default()),
            placeholder,
        }
    }

    pub fn with_schema(mut self, schema: SectionSchema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Section type registered twice: {0}")]
    DuplicateType(SectionType),
}

/// Collects descriptors before the registry is frozen
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    sections: Vec<SectionDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: SectionDescriptor) -> Result<&mut Self, RegistryError> {
        if self
            .sections
            .iter()
            .any(|s| s.section_type == descriptor.section_type)
        {
            return Err(RegistryError::DuplicateType(descriptor.section_type));
        }

        self.sections.push(descriptor);
        Ok(self)
    }

    pub fn build(self) -> SectionRegistry {
        let index = self
            .sections
            .iter()
            .enumerate()
            .map(|(i, s)| (s.section_type.clone(), i))
            .collect();

        tracing::info!(sections = self.sections.len(), "section registry built");

        SectionRegistry {
            sections: self.sections,
            index,
        }
    }
}

/// Read-only catalog of known section types
///
/// Built once through [`RegistryBuilder`]; there is no way to add entries
/// afterwards.
#[derive(Debug)]
pub struct SectionRegistry {
    sections: Vec<SectionDescriptor>,
    index: HashMap<SectionType, usize>,
}

impl SectionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, section_type: &SectionType) -> Option<&SectionDescriptor> {
        self.index.get(section_type).map(|&i| &self.sections[i])
    }

    pub fn contains(&self, section_type: &SectionType) -> bool {
        self.index.contains_key(section_type)
    }

    /// All descriptors in registration order
    pub fn list_all(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    pub fn list_by_group(&self, group: &str) -> Vec<&SectionDescriptor> {
        self.sections.iter().filter(|s| s.group == group).collect()
    }

    /// Distinct group names, sorted
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = self.sections.iter().map(|s| s.group.as_str()).collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Blank;

    impl SectionRenderer for Blank {
        fn render(&self, _section: &Section, _props: &Props) -> VNode {
            VNode::element("section")
        }
    }

    fn descriptor(ty: &str, group: &str) -> SectionDescriptor {
        SectionDescriptor::new(ty, ty.to_uppercase(), group, Arc::new(Blank))
    }

    fn registry() -> SectionRegistry {
        let mut builder = SectionRegistry::builder();
        builder
            .register(descriptor("hero", "Headers"))
            .unwrap()
            .register(descriptor("footer", "Footers"))
            .unwrap()
            .register(descriptor("banner", "Headers"))
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_get_by_type() {
        let registry = registry();
        let hero = registry.get(&"hero".into()).unwrap();

        assert_eq!(hero.display_name, "HERO");
        assert_eq!(hero.placeholder, "placeholders/hero.png");
        assert!(registry.get(&"missing".into()).is_none());
    }

    #[test]
    fn test_list_by_group_keeps_registration_order() {
        let registry = registry();
        let headers: Vec<_> = registry
            .list_by_group("Headers")
            .iter()
            .map(|s| s.section_type.as_str())
            .collect();

        assert_eq!(headers, vec!["hero", "banner"]);
        assert!(registry.list_by_group("Nope").is_empty());
    }

    #[test]
    fn test_groups_sorted_and_distinct() {
        assert_eq!(registry().groups(), vec!["Footers", "Headers"]);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut builder = SectionRegistry::builder();
        builder.register(descriptor("hero", "Headers")).unwrap();

        let err = builder.register(descriptor("hero", "Other")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateType("hero".into()));
        assert_eq!(builder.build().len(), 1);
    }
}
