//! Standard section catalog
//!
//! Generic section kinds rendered by [`BlockRenderer`]. Real visual renderers
//! plug in through [`SectionRenderer`](crate::SectionRenderer) the same way.

use crate::registry::{SectionDescriptor, SectionRegistry, SectionRenderer};
use crate::schema::{FieldDescriptor, FieldType, Props, SectionSchema};
use crate::vdom::VNode;
use pagewright_document::Section;
use serde_json::{json, Value};
use std::sync::Arc;

/// Renders a section as a tagged container with one child per prop
#[derive(Debug, Clone)]
pub struct BlockRenderer {
    tag: &'static str,
}

impl BlockRenderer {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl SectionRenderer for BlockRenderer {
    fn render(&self, section: &Section, props: &Props) -> VNode {
        let children = props
            .values()
            .iter()
            .map(|(field, value)| {
                VNode::element("div")
                    .with_attr("data-field", field.as_str())
                    .with_key(field.as_str())
                    .with_child(VNode::text(display_value(value)))
            })
            .collect();

        VNode::element(self.tag)
            .with_section_marker(&section.id, &section.section_type)
            .with_children(children)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn text(id: &str, default: &str) -> FieldDescriptor {
    FieldDescriptor::new(id, FieldType::Text, default)
}

fn color(id: &str, default: &str) -> FieldDescriptor {
    FieldDescriptor::new(id, FieldType::Color, default)
}

fn spacing() -> FieldDescriptor {
    FieldDescriptor::new("padding", FieldType::Range, 48).with_label("Vertical padding")
}

/// Registry with the built-in section kinds
pub fn standard() -> SectionRegistry {
    let block = Arc::new(BlockRenderer::new("section"));
    let footer = Arc::new(BlockRenderer::new("footer"));

    let descriptors = vec![
        SectionDescriptor::new("hero", "Hero", "Headers", block.clone()).with_schema(
            SectionSchema::new()
                .content(text("title", "Welcome"))
                .content(FieldDescriptor::new("subtitle", FieldType::Textarea, ""))
                .content(FieldDescriptor::new("backgroundImage", FieldType::Image, Value::Null))
                .style(color("backgroundColor", "#ffffff"))
                .style(spacing()),
        ),
        SectionDescriptor::new("text", "Text", "Content", block.clone()).with_schema(
            SectionSchema::new()
                .content(FieldDescriptor::new("body", FieldType::RichText, ""))
                .style(FieldDescriptor::new("align", FieldType::Select, "left"))
                .style(spacing()),
        ),
        SectionDescriptor::new("gallery", "Image Gallery", "Media", block.clone()).with_schema(
            SectionSchema::new()
                .content(FieldDescriptor::new("blocks", FieldType::Repeater, json!([])))
                .style(FieldDescriptor::new("columns", FieldType::Number, 3)),
        ),
        SectionDescriptor::new("call-to-action", "Call to Action", "Marketing", block.clone())
            .with_schema(
                SectionSchema::new()
                    .content(text("heading", "Ready to start?"))
                    .content(FieldDescriptor::new("buttonLink", FieldType::Link, "#"))
                    .content(text("buttonLabel", "Get started"))
                    .style(color("accentColor", "#2563eb")),
            ),
        SectionDescriptor::new("testimonials", "Testimonials", "Marketing", block).with_schema(
            SectionSchema::new()
                .content(FieldDescriptor::new("blocks", FieldType::Repeater, json!([])))
                .style(FieldDescriptor::new("showAvatars", FieldType::Toggle, true)),
        ),
        SectionDescriptor::new("footer", "Footer", "Footers", footer).with_schema(
            SectionSchema::new()
                .content(text("copyright", ""))
                .style(color("backgroundColor", "#111827")),
        ),
    ];

    let mut builder = SectionRegistry::builder();
    for descriptor in descriptors {
        if let Err(err) = builder.register(descriptor) {
            tracing::warn!(%err, "skipping catalog entry");
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::resolve;
    use crate::vdom::{SECTION_ID_ATTR, SECTION_TYPE_ATTR};

    #[test]
    fn test_standard_catalog_groups() {
        let registry = standard();
        assert_eq!(
            registry.groups(),
            vec!["Content", "Footers", "Headers", "Marketing", "Media"]
        );
        assert_eq!(registry.list_by_group("Marketing").len(), 2);
    }

    #[test]
    fn test_block_renderer_marks_section_root() {
        let registry = standard();
        let section = Section::new("s1", "hero").with_setting("title", "Hi");
        let descriptor = registry.get(&section.section_type).unwrap();

        let props = resolve(&descriptor.schema, &section.settings);
        let node = descriptor.renderer.render(&section, &props);

        assert_eq!(node.attr(SECTION_ID_ATTR), Some("s1"));
        assert_eq!(node.attr(SECTION_TYPE_ATTR), Some("hero"));
        assert_eq!(node.children().len(), props.len());
    }
}
