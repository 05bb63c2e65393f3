//! # Editor Session
//!
//! The authoritative side of the sync protocol.
//!
//! The session owns the one writable [`EditorState`]. Every change, whether
//! it starts in the editor UI or as an intent reported by the preview, goes
//! through [`EditorSession::dispatch`], which reduces it and returns the
//! envelope to forward. The preview replays that envelope through the same
//! reducer, so the two copies only ever change in lockstep.
//!
//! Methods return outbound envelopes instead of sending them; the actor owns
//! the port, so the session itself stays synchronous.

use crate::store::SavedSettings;
use pagewright_bridge::{
    Action, Barrier, Completion, Envelope, Inbox, Message, Origin, RequestId, Viewport,
};
use pagewright_document::{
    Command, Document, EditorState, GlobalStyles, Section, SectionId, SectionType, Settings,
    StyleScope,
};
use pagewright_registry::{resolve, SectionRegistry};
use std::sync::Arc;
use std::time::Duration;

pub struct EditorSession {
    origin: Origin,
    inbox: Inbox,
    state: EditorState,
    registry: Arc<SectionRegistry>,
    selection: Option<SectionId>,
    viewport: Viewport,
    styles: GlobalStyles,
    barrier: Barrier,
    id_counter: u64,
}

impl EditorSession {
    /// `preview_session` is the only preview whose envelopes are accepted
    pub fn new(
        session_id: impl Into<String>,
        preview_session: impl Into<String>,
        registry: Arc<SectionRegistry>,
    ) -> Self {
        Self {
            origin: Origin::editor(session_id),
            inbox: Inbox::new(Origin::preview(preview_session)),
            state: EditorState::default(),
            registry,
            selection: None,
            viewport: Viewport::default(),
            styles: GlobalStyles::default(),
            barrier: Barrier::default(),
            id_counter: 0,
        }
    }

    pub fn with_state(mut self, state: EditorState) -> Self {
        self.state = state;
        self
    }

    pub fn with_styles(mut self, styles: GlobalStyles) -> Self {
        self.styles = styles;
        self
    }

    pub fn with_barrier_timeout(mut self, timeout: Duration) -> Self {
        self.barrier = Barrier::new(timeout);
        self
    }

    /// Start from previously saved settings with a fresh history
    ///
    /// Repeated section ids keep their first occurrence only.
    pub fn with_saved(self, saved: SavedSettings, history_limit: usize) -> Self {
        let document = Document::deduplicated(saved.sections);
        let state = EditorState::with_history_limit(document, history_limit);
        self.with_state(state).with_styles(saved.styles)
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        self.state.document()
    }

    pub fn revision(&self) -> u64 {
        self.state.revision()
    }

    pub fn selection(&self) -> Option<&SectionId> {
        self.selection.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn styles(&self) -> &GlobalStyles {
        &self.styles
    }

    pub fn registry(&self) -> &Arc<SectionRegistry> {
        &self.registry
    }

    /// Everything a freshly connected preview needs to match this session
    pub fn sync(&self) -> Vec<Envelope> {
        let mut out = vec![
            self.restore(),
            self.envelope(Message::ViewportChange {
                viewport: self.viewport,
            }),
        ];

        for scope in [
            StyleScope::Typography,
            StyleScope::Branding,
            StyleScope::CustomStyle,
        ] {
            let settings = self.styles.scope(scope);
            if !settings.is_empty() {
                out.push(self.envelope(Message::style_update(scope, settings.clone())));
            }
        }

        out
    }

    /// Reduce a command and return the envelope announcing it
    ///
    /// Commands that leave the document unchanged produce nothing.
    pub fn dispatch(&mut self, command: Command) -> Vec<Envelope> {
        let message = Message::from_command(&command);
        self.commit(&command, message)
    }

    /// Add a section of a registered type, filled with its schema defaults
    pub fn add_from_catalog(
        &mut self,
        section_type: &SectionType,
        index: Option<usize>,
    ) -> Vec<Envelope> {
        let Some(descriptor) = self.registry.get(section_type) else {
            tracing::debug!(%section_type, "not in the section catalog");
            return Vec::new();
        };

        let defaults: Settings = resolve(&descriptor.schema, &Settings::new())
            .values()
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let section = Section::new(self.new_section_id(section_type), section_type.clone())
            .with_settings(defaults);
        let id = section.id.clone();

        let command = Command::AddSection { section, index };
        let mut message = Message::from_command(&command);
        if let Message::AddSection {
            scroll_to_section, ..
        } = &mut message
        {
            *scroll_to_section = true;
        }

        let mut out = self.commit(&command, message);
        if !out.is_empty() {
            out.extend(self.select(Some(id)));
        }
        out
    }

    /// Duplicate a section under a freshly generated id
    pub fn duplicate(&mut self, section_id: &SectionId) -> Vec<Envelope> {
        let Some(section) = self.state.document().get(section_id) else {
            tracing::debug!(%section_id, "duplicate of unknown section");
            return Vec::new();
        };

        let section_type = section.section_type.clone();
        let new_section_id = self.new_section_id(&section_type);
        self.dispatch(Command::DuplicateSection {
            section_id: section_id.clone(),
            new_section_id,
        })
    }

    pub fn select(&mut self, section_id: Option<SectionId>) -> Vec<Envelope> {
        if let Some(id) = &section_id {
            if !self.state.document().contains(id) {
                tracing::debug!(section_id = %id, "cannot select a missing section");
                return Vec::new();
            }
        }

        self.selection = section_id.clone();
        vec![self.envelope(Message::SelectSection { section_id })]
    }

    pub fn hover(&self, section_id: Option<SectionId>) -> Vec<Envelope> {
        vec![self.envelope(Message::HoverSection { section_id })]
    }

    pub fn scroll_to(&self, section_id: SectionId) -> Vec<Envelope> {
        vec![self.envelope(Message::ScrollToSection { section_id })]
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Vec<Envelope> {
        if self.viewport == viewport {
            return Vec::new();
        }
        self.viewport = viewport;
        vec![self.envelope(Message::ViewportChange { viewport })]
    }

    pub fn update_styles(&mut self, scope: StyleScope, settings: Settings) -> Vec<Envelope> {
        if !self.styles.merge(scope, &settings) {
            return Vec::new();
        }
        vec![self.envelope(Message::style_update(scope, settings))]
    }

    /// Ask the preview to flush pending inline edits
    pub fn request_flush(&mut self) -> (Envelope, Completion) {
        let (message, completion) = self.barrier.request(Action::FlushEditable);
        (self.envelope(message), completion)
    }

    pub fn cancel_flush(&mut self, request_id: RequestId) {
        self.barrier.cancel(request_id);
    }

    /// Current document and styles, as a save would persist them
    pub fn snapshot(&self) -> SavedSettings {
        SavedSettings {
            sections: self.state.document().sections().to_vec(),
            styles: self.styles.clone(),
        }
    }

    /// Decode, authenticate and handle raw inbound text
    pub fn handle_raw(&mut self, raw: &str) -> Vec<Envelope> {
        match self.inbox.accept(raw) {
            Some(envelope) => self.handle(envelope),
            None => Vec::new(),
        }
    }

    pub fn handle(&mut self, envelope: Envelope) -> Vec<Envelope> {
        match envelope.message {
            Message::SectionSelected {
                section_id,
                section_type,
            } => {
                if self.state.document().contains(&section_id) {
                    tracing::debug!(%section_id, %section_type, "selected in preview");
                    self.selection = Some(section_id);
                } else {
                    tracing::debug!(%section_id, "preview selected a section we do not have");
                }
                Vec::new()
            }
            Message::DocumentChanged { sections } => self.reconcile(envelope.revision, sections),
            Message::ResyncRequest {} => {
                tracing::info!(revision = self.revision(), "preview requested resync");
                vec![self.restore()]
            }
            Message::ActionComplete { action, request_id } => {
                self.barrier.complete(action, request_id);
                Vec::new()
            }
            Message::ActionRequest { action, request_id } => {
                // Nothing is buffered on this side
                vec![self.envelope(Message::ActionComplete { action, request_id })]
            }
            message @ (Message::MoveSection { .. } | Message::Undo {} | Message::Redo {}) => {
                tracing::debug!(tag = message.tag(), "preview cannot issue this command");
                Vec::new()
            }
            message => match message.to_command() {
                Some(command) => {
                    tracing::debug!(command = command.name(), "intent from preview");
                    self.dispatch(command)
                }
                None => {
                    tracing::debug!(tag = message.tag(), "ignoring message meant for the preview");
                    Vec::new()
                }
            },
        }
    }

    fn reconcile(&self, revision: u64, sections: Vec<Section>) -> Vec<Envelope> {
        let current = self.revision();

        if revision < current {
            tracing::debug!(revision, current, "stale document echo ignored");
            return Vec::new();
        }

        if revision == current && sections.as_slice() == self.state.document().sections() {
            return Vec::new();
        }

        tracing::warn!(revision, current, "preview mirror diverged, restoring");
        vec![self.restore()]
    }

    fn commit(&mut self, command: &Command, message: Message) -> Vec<Envelope> {
        if !self.state.apply(command) {
            return Vec::new();
        }

        if let Some(selected) = &self.selection {
            if !self.state.document().contains(selected) {
                self.selection = None;
            }
        }

        vec![self.envelope(message)]
    }

    fn restore(&self) -> Envelope {
        self.envelope(Message::RestoreHistory {
            state: self.state.clone(),
        })
    }

    fn envelope(&self, message: Message) -> Envelope {
        Envelope::new(self.origin.clone(), self.state.revision(), message)
    }

    fn new_section_id(&mut self, section_type: &SectionType) -> SectionId {
        loop {
            self.id_counter += 1;
            let id = SectionId::new(format!(
                "{}-{}-{}",
                section_type,
                chrono::Utc::now().timestamp_millis(),
                self.id_counter
            ));
            if !self.state.document().contains(&id) {
                return id;
            }
        }
    }
}
