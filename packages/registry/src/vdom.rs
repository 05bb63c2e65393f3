use pagewright_document::{SectionId, SectionType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute carrying the section id on a section's root element
pub const SECTION_ID_ATTR: &str = "data-section-id";

/// Attribute carrying the section type on a section's root element
pub const SECTION_TYPE_ATTR: &str = "data-section-type";

/// Virtual DOM node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// HTML element
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<VNode>,
        /// Explicit key for list items
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },

    /// Text node
    Text { content: String },

    /// Error node (rendered inline instead of failing the whole page)
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        section_id: Option<SectionId>,
    },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            key: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>, section_id: Option<SectionId>) -> Self {
        VNode::Error {
            message: message.into(),
            section_id,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        if let VNode::Element {
            key: ref mut node_key,
            ..
        } = self
        {
            *node_key = Some(key.into());
        }
        self
    }

    /// Tag an element as the root of a section so hit-testing can find it
    pub fn with_section_marker(self, id: &SectionId, section_type: &SectionType) -> Self {
        self.with_attr(SECTION_ID_ATTR, id.as_str())
            .with_attr(SECTION_TYPE_ATTR, section_type.as_str())
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, VNode::Error { .. })
    }
}

/// Rendered page: root nodes plus page-wide CSS rules
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderTree {
    pub nodes: Vec<VNode>,
    pub styles: Vec<CssRule>,
}

/// CSS Rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssRule {
    pub selector: String,
    pub properties: BTreeMap<String, String>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: VNode) {
        self.nodes.push(node);
    }

    pub fn add_style(&mut self, selector: impl Into<String>, properties: BTreeMap<String, String>) {
        self.styles.push(CssRule {
            selector: selector.into(),
            properties,
        });
    }

    /// Count error nodes anywhere in the tree
    pub fn error_count(&self) -> usize {
        fn count(node: &VNode) -> usize {
            let own = usize::from(node.is_error());
            own + node.children().iter().map(count).sum::<usize>()
        }
        self.nodes.iter().map(count).sum()
    }
}
