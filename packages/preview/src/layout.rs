//! # Layout
//!
//! Geometry for the rendered page and the [`Surface`] the overlay hit-tests
//! against.
//!
//! [`LayoutTree`] stacks section roots vertically, full canvas width. Each
//! section is as tall as its `data-height` attribute, or the viewport's
//! default section height. Children split their parent's inner box into
//! equal rows, recursively, so a point inside a section usually lands on a
//! descendant and hit-testing has to walk up to the marked ancestor.

use crate::render::HEIGHT_ATTR;
use pagewright_bridge::Viewport;
use pagewright_document::{SectionId, SectionType};
use pagewright_registry::{RenderTree, VNode, SECTION_ID_ATTR, SECTION_TYPE_ATTR};
use serde::Serialize;
use std::fmt;

const SECTION_INSET: f64 = 16.0;
const CHILD_INSET: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open on the far edges, so stacked boxes never share a point
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    fn inset(&self, by: f64) -> Self {
        let by = by.min(self.width / 2.0).min(self.height / 2.0);
        Self::new(
            self.x + by,
            self.y + by,
            self.width - 2.0 * by,
            self.height - 2.0 * by,
        )
    }
}

/// Section id and type found on a marked element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMarker {
    pub id: SectionId,
    pub section_type: SectionType,
}

/// Element tree the overlay can query
///
/// Points passed to [`element_at`](Surface::element_at) are in viewport
/// coordinates; [`bounds`](Surface::bounds) are in document coordinates.
pub trait Surface {
    type Element: Copy + Eq + fmt::Debug;

    fn element_at(&self, point: Point) -> Option<Self::Element>;
    fn parent(&self, element: Self::Element) -> Option<Self::Element>;
    fn marker(&self, element: Self::Element) -> Option<&SectionMarker>;
    fn bounds(&self, element: Self::Element) -> Option<Rect>;
    fn scroll_offset(&self) -> Point;
    fn find_section(&self, id: &SectionId) -> Option<Self::Element>;

    /// Nearest ancestor-or-self of the element under `point` carrying a marker
    fn section_at(&self, point: Point) -> Option<Self::Element> {
        let mut current = self.element_at(point);
        while let Some(element) = current {
            if self.marker(element).is_some() {
                return Some(element);
            }
            current = self.parent(element);
        }
        None
    }

    /// Bounds in viewport coordinates
    fn geometry(&self, element: Self::Element) -> Option<Rect> {
        let scroll = self.scroll_offset();
        self.bounds(element).map(|b| b.translate(-scroll.x, -scroll.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct LayoutNode {
    parent: Option<NodeId>,
    bounds: Rect,
    marker: Option<SectionMarker>,
}

/// Laid-out render tree plus the canvas scroll position
#[derive(Debug, Clone)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
    viewport: Viewport,
    scroll: Point,
    content_height: f64,
}

impl LayoutTree {
    pub fn build(tree: &RenderTree, viewport: Viewport) -> Self {
        let mut layout = Self {
            nodes: Vec::new(),
            viewport,
            scroll: Point::default(),
            content_height: 0.0,
        };

        let width = viewport.width();
        let mut y = 0.0;

        for root in &tree.nodes {
            let marker = match (root.attr(SECTION_ID_ATTR), root.attr(SECTION_TYPE_ATTR)) {
                (Some(id), Some(section_type)) => SectionMarker {
                    id: id.into(),
                    section_type: section_type.into(),
                },
                _ => {
                    tracing::debug!("skipping unmarked root node");
                    continue;
                }
            };

            let height = root
                .attr(HEIGHT_ATTR)
                .and_then(|h| h.parse::<f64>().ok())
                .filter(|h| *h > 0.0)
                .unwrap_or_else(|| viewport.section_height());

            let bounds = Rect::new(0.0, y, width, height);
            let id = layout.push(None, bounds, Some(marker));
            layout.layout_children(root, id, bounds.inset(SECTION_INSET));
            y += height;
        }

        layout.content_height = y;
        layout
    }

    /// Rebuild for a new render tree, keeping the scroll position where possible
    pub fn rebuild(&mut self, tree: &RenderTree, viewport: Viewport) {
        let scroll = self.scroll;
        *self = Self::build(tree, viewport);
        self.scroll_to(scroll.y);
    }

    fn push(&mut self, parent: Option<NodeId>, bounds: Rect, marker: Option<SectionMarker>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(LayoutNode {
            parent,
            bounds,
            marker,
        });
        id
    }

    fn layout_children(&mut self, node: &VNode, parent: NodeId, area: Rect) {
        let children: Vec<&VNode> = node
            .children()
            .iter()
            .filter(|c| !matches!(c, VNode::Text { .. }))
            .collect();

        if children.is_empty() {
            return;
        }

        let row = area.height / children.len() as f64;
        for (i, child) in children.into_iter().enumerate() {
            let bounds = Rect::new(area.x, area.y + row * i as f64, area.width, row);
            let id = self.push(Some(parent), bounds, None);
            self.layout_children(child, id, bounds.inset(CHILD_INSET));
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn max_scroll(&self) -> f64 {
        (self.content_height - self.viewport.height()).max(0.0)
    }

    pub fn scroll_to(&mut self, y: f64) {
        self.scroll.y = y.clamp(0.0, self.max_scroll());
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.scroll_to(self.scroll.y + dy);
    }

    /// Scroll so the section's top edge is at the top of the canvas
    pub fn scroll_into_view(&mut self, id: &SectionId) -> bool {
        match self.find_section(id).and_then(|e| self.bounds(e)) {
            Some(bounds) => {
                self.scroll_to(bounds.y);
                true
            }
            None => false,
        }
    }

    fn canvas(&self) -> Rect {
        Rect::new(0.0, 0.0, self.viewport.width(), self.viewport.height())
    }
}

impl Surface for LayoutTree {
    type Element = NodeId;

    fn element_at(&self, point: Point) -> Option<NodeId> {
        if !self.canvas().contains(point) {
            return None;
        }

        let target = Point::new(point.x + self.scroll.x, point.y + self.scroll.y);
        // Children follow their parents, so the last hit is the deepest
        self.nodes
            .iter()
            .rposition(|n| n.bounds.contains(target))
            .map(NodeId)
    }

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        self.nodes.get(element.0).and_then(|n| n.parent)
    }

    fn marker(&self, element: NodeId) -> Option<&SectionMarker> {
        self.nodes.get(element.0).and_then(|n| n.marker.as_ref())
    }

    fn bounds(&self, element: NodeId) -> Option<Rect> {
        self.nodes.get(element.0).map(|n| n.bounds)
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn find_section(&self, id: &SectionId) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.marker.as_ref().is_some_and(|m| &m.id == id))
            .map(NodeId)
    }
}
