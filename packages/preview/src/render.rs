//! # Rendering
//!
//! Mirror document → [`RenderTree`]. One root element per visible section,
//! each tagged with the section marker the overlay hit-tests against.
//!
//! Rendering never fails as a whole:
//!
//! - unknown section type → marked wrapper around an `Error` node
//! - unsupported schema field → inline `Error` placeholder appended to the
//!   section
//!
//! Props come from a [`ResolverCache`]; sections whose settings `Arc` did not
//! change since the last render reuse the resolved props.

use pagewright_document::{Document, GlobalStyles, Section};
use pagewright_registry::{RenderTree, ResolverCache, SectionRegistry, VNode};

/// Attribute carrying an explicit section height in pixels
pub const HEIGHT_ATTR: &str = "data-height";

/// Settings key read for [`HEIGHT_ATTR`]
pub const HEIGHT_KEY: &str = "height";

pub fn render_document(
    document: &Document,
    styles: &GlobalStyles,
    registry: &SectionRegistry,
    cache: &mut ResolverCache,
) -> RenderTree {
    let mut tree = RenderTree::new();

    for section in document.iter().filter(|s| s.is_visible) {
        tree.add_node(render_section(section, registry, cache));
    }

    let mut root = styles.custom_properties();
    if let Some(scheme) = &styles.color_scheme {
        root.insert("color-scheme".to_string(), scheme.clone());
    }
    if !root.is_empty() {
        tree.add_style(":root", root);
    }

    tree
}

pub fn render_section(
    section: &Section,
    registry: &SectionRegistry,
    cache: &mut ResolverCache,
) -> VNode {
    let node = match registry.get(&section.section_type) {
        Some(descriptor) => {
            let props = cache.resolve(&descriptor.schema, &section.settings);
            let placeholders: Vec<VNode> = props
                .unsupported()
                .iter()
                .map(|field| {
                    VNode::error(
                        format!(
                            "Unsupported field type \"{}\" for field {}",
                            field.field_type, field.field_id
                        ),
                        Some(section.id.clone()),
                    )
                })
                .collect();

            descriptor
                .renderer
                .render(section, &props)
                .with_children(placeholders)
        }
        None => {
            tracing::debug!(section_id = %section.id, section_type = %section.section_type, "unknown section type");
            VNode::element("div").with_child(VNode::error(
                format!("Unknown section type: {}", section.section_type),
                Some(section.id.clone()),
            ))
        }
    };

    let node = node.with_section_marker(&section.id, &section.section_type);

    match section.setting(HEIGHT_KEY).and_then(|v| v.as_f64()) {
        Some(height) if height > 0.0 => node.with_attr(HEIGHT_ATTR, height.to_string()),
        _ => node,
    }
}
