//! # Preview Session
//!
//! The preview side of the sync protocol: a mirror of the editor's state,
//! rendered, laid out and overlaid with selection highlights.
//!
//! The mirror is never edited directly. User intents raised in the preview
//! (adding a section, a drag-reorder, inline text edits) are sent to the
//! editor, which reduces them and sends back the command to replay.
//!
//! Inline edits are buffered per section until the editor asks for them
//! with `ACTION_REQUEST FLUSH_EDITABLE`, or until [`flush_edits`] is called.
//!
//! [`flush_edits`]: PreviewSession::flush_edits

use crate::layout::{LayoutTree, NodeId, Point};
use crate::mirror::{Mirror, MirrorOutcome};
use crate::overlay::Overlay;
use crate::render::render_document;
use pagewright_bridge::{Action, Envelope, Inbox, Message, Origin, Viewport};
use pagewright_document::{
    Command, Document, EditorState, GlobalStyles, Section, SectionId, Settings,
};
use pagewright_registry::{RenderTree, ResolverCache, SectionRegistry};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How long an unanswered `RESYNC_REQUEST` holds back another one
pub const RESYNC_RETRY: Duration = Duration::from_secs(1);

pub struct PreviewSession {
    origin: Origin,
    inbox: Inbox,
    mirror: Mirror,
    registry: Arc<SectionRegistry>,
    cache: ResolverCache,
    tree: RenderTree,
    layout: LayoutTree,
    overlay: Overlay<NodeId>,
    viewport: Viewport,
    styles: GlobalStyles,
    pending_edits: BTreeMap<SectionId, Settings>,
    resync_requested: Option<Instant>,
}

impl PreviewSession {
    /// `editor_session` is the only editor whose envelopes are accepted
    pub fn new(
        session_id: impl Into<String>,
        editor_session: impl Into<String>,
        registry: Arc<SectionRegistry>,
    ) -> Self {
        let viewport = Viewport::default();
        let tree = RenderTree::new();
        let layout = LayoutTree::build(&tree, viewport);

        Self {
            origin: Origin::preview(session_id),
            inbox: Inbox::new(Origin::editor(editor_session)),
            mirror: Mirror::new(),
            registry,
            cache: ResolverCache::new(),
            tree,
            layout,
            overlay: Overlay::new(),
            viewport,
            styles: GlobalStyles::default(),
            pending_edits: BTreeMap::new(),
            resync_requested: None,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn state(&self) -> &EditorState {
        self.mirror.state()
    }

    pub fn document(&self) -> &Document {
        self.mirror.document()
    }

    pub fn revision(&self) -> u64 {
        self.mirror.revision()
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn layout(&self) -> &LayoutTree {
        &self.layout
    }

    pub fn overlay(&self) -> &Overlay<NodeId> {
        &self.overlay
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn styles(&self) -> &GlobalStyles {
        &self.styles
    }

    pub fn pending_edits(&self) -> usize {
        self.pending_edits.len()
    }

    /// Decode, authenticate and handle raw inbound text
    pub fn handle_raw(&mut self, raw: &str) -> Vec<Envelope> {
        match self.inbox.accept(raw) {
            Some(envelope) => self.handle(envelope),
            None => Vec::new(),
        }
    }

    pub fn handle(&mut self, envelope: Envelope) -> Vec<Envelope> {
        let Envelope {
            revision, message, ..
        } = envelope;

        if let Some(command) = message.to_command() {
            return self.replay(revision, &command, &message);
        }

        if let Some((scope, settings)) = message.as_style_update() {
            if self.styles.merge(scope, settings) {
                self.rerender();
            }
            return Vec::new();
        }

        match message {
            Message::RestoreHistory { state } => {
                let revision = state.revision();
                if !self.mirror.restore(state) {
                    tracing::debug!(revision, current = self.revision(), "stale restore dropped");
                    return Vec::new();
                }
                tracing::info!(revision, "mirror restored");
                self.resync_requested = None;
                self.after_document_change();
                vec![self.document_changed()]
            }
            Message::SelectSection { section_id } => {
                self.overlay.select_section(&self.layout, section_id.as_ref());
                Vec::new()
            }
            Message::HoverSection { section_id } => {
                self.overlay.hover_section(&self.layout, section_id.as_ref());
                Vec::new()
            }
            Message::ScrollToSection { section_id } => {
                self.scroll_into_view(&section_id);
                Vec::new()
            }
            Message::ViewportChange { viewport } => {
                if self.viewport != viewport {
                    self.viewport = viewport;
                    self.relayout();
                }
                Vec::new()
            }
            Message::ActionRequest { action, request_id } => {
                let mut out = match action {
                    Action::FlushEditable => self.flush_edits(),
                    Action::Unknown => {
                        tracing::debug!(%request_id, "unknown action, completing anyway");
                        Vec::new()
                    }
                };
                out.push(self.envelope(Message::ActionComplete { action, request_id }));
                out
            }
            message => {
                tracing::debug!(tag = message.tag(), "ignoring message meant for the editor");
                Vec::new()
            }
        }
    }

    fn replay(&mut self, revision: u64, command: &Command, message: &Message) -> Vec<Envelope> {
        match self.mirror.apply(revision, command) {
            MirrorOutcome::Applied => {
                self.after_document_change();
                self.follow_scroll_hint(message);
                vec![self.document_changed()]
            }
            MirrorOutcome::Duplicate => {
                tracing::debug!(revision, current = self.revision(), "duplicate command dropped");
                Vec::new()
            }
            MirrorOutcome::Gap { expected, got } => {
                tracing::warn!(expected, got, "missed editor command");
                self.request_resync()
            }
            MirrorOutcome::Diverged { local, remote } => {
                tracing::warn!(local, remote, "mirror diverged");
                self.after_document_change();
                self.request_resync()
            }
        }
    }

    /// One outstanding `RESYNC_REQUEST` at a time, re-sent after [`RESYNC_RETRY`]
    fn request_resync(&mut self) -> Vec<Envelope> {
        let now = Instant::now();
        if let Some(requested) = self.resync_requested {
            if now < requested + RESYNC_RETRY {
                tracing::debug!("resync already requested");
                return Vec::new();
            }
        }
        self.resync_requested = Some(now);
        vec![self.envelope(Message::ResyncRequest {})]
    }

    pub fn resync_pending(&self) -> bool {
        self.resync_requested.is_some()
    }

    fn follow_scroll_hint(&mut self, message: &Message) {
        let target = match message {
            Message::AddSection {
                section,
                scroll_to_section: true,
                ..
            } => Some(&section.id),
            Message::ReorderSections {
                scroll_to_section_id: Some(id),
                ..
            } => Some(id),
            _ => None,
        };

        if let Some(id) = target {
            let id = id.clone();
            self.scroll_into_view(&id);
        }
    }

    pub fn pointer_move(&mut self, point: Point, now: Instant) {
        self.overlay.pointer_move(&self.layout, point, now);
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        self.overlay.pointer_leave(now);
    }

    /// Returns the `SECTION_SELECTED` notification when the click selected a section
    pub fn click(&mut self, point: Point, now: Instant) -> Vec<Envelope> {
        match self.overlay.click(&self.layout, point, now) {
            Some(marker) => vec![self.envelope(Message::SectionSelected {
                section_id: marker.id,
                section_type: marker.section_type,
            })],
            None => Vec::new(),
        }
    }

    pub fn settle(&mut self, now: Instant) {
        self.overlay.settle(now);
    }

    pub fn settle_deadline(&self) -> Option<Instant> {
        self.overlay.settle_deadline()
    }

    pub fn scroll_by(&mut self, dy: f64) {
        self.layout.scroll_by(dy);
        self.overlay.refresh(&self.layout);
    }

    fn scroll_into_view(&mut self, id: &SectionId) {
        if !self.layout.scroll_into_view(id) {
            tracing::debug!(section_id = %id, "cannot scroll to a section that is not rendered");
        }
        self.overlay.refresh(&self.layout);
    }

    /// Ask the editor to add a section
    pub fn add_section(&self, section: Section, index: Option<usize>) -> Vec<Envelope> {
        vec![self.envelope(Message::AddSection {
            section,
            index,
            scroll_to_section: true,
        })]
    }

    /// Report a drag-reorder result
    pub fn reorder(&self, sections: Vec<Section>) -> Vec<Envelope> {
        vec![self.envelope(Message::SetSections { sections })]
    }

    /// Buffer an inline edit until the next flush
    pub fn edit_inline(&mut self, section_id: SectionId, key: impl Into<String>, value: Value) {
        if !self.document().contains(&section_id) {
            tracing::debug!(%section_id, "inline edit on a missing section dropped");
            return;
        }
        self.pending_edits
            .entry(section_id)
            .or_default()
            .insert(key.into(), value);
    }

    /// Send buffered inline edits to the editor, one update per section
    pub fn flush_edits(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.pending_edits)
            .into_iter()
            .map(|(section_id, updates)| {
                self.envelope(Message::UpdateSection {
                    section_id,
                    updates,
                })
            })
            .collect()
    }

    fn after_document_change(&mut self) {
        let document = self.mirror.document();
        self.pending_edits.retain(|id, _| document.contains(id));
        self.rerender();
    }

    fn rerender(&mut self) {
        self.tree = render_document(
            self.mirror.document(),
            &self.styles,
            &self.registry,
            &mut self.cache,
        );
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout.rebuild(&self.tree, self.viewport);
        self.overlay.refresh(&self.layout);
    }

    fn document_changed(&self) -> Envelope {
        self.envelope(Message::DocumentChanged {
            sections: self.mirror.document().sections().to_vec(),
        })
    }

    fn envelope(&self, message: Message) -> Envelope {
        Envelope::new(self.origin.clone(), self.mirror.revision(), message)
    }
}
