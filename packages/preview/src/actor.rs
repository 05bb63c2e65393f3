//! # Preview Actor
//!
//! Runs a [`PreviewSession`] on its own task, multiplexing editor envelopes,
//! pointer events from the canvas, UI requests and the overlay's settle
//! timer.

use crate::error::PreviewError;
use crate::layout::{NodeId, Point, Surface};
use crate::overlay::Highlight;
use crate::session::PreviewSession;
use pagewright_bridge::{Envelope, Port, PortReceiver, PortSender, Viewport};
use pagewright_document::{EditorState, GlobalStyles, Section, SectionId};
use pagewright_registry::RenderTree;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

type Reply<T> = oneshot::Sender<T>;

/// Canvas input, in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move(Point),
    Leave,
    Click(Point),
    Scroll(f64),
}

#[derive(Debug)]
pub enum PreviewRequest {
    AddSection {
        section: Section,
        index: Option<usize>,
    },
    Reorder(Vec<Section>),
    EditInline {
        section_id: SectionId,
        key: String,
        value: Value,
    },
    Snapshot(Reply<PreviewSnapshot>),
}

#[derive(Debug, Clone)]
pub struct PreviewSnapshot {
    pub state: EditorState,
    pub tree: RenderTree,
    pub selection: Option<Highlight<NodeId>>,
    pub hover: Option<Highlight<NodeId>>,
    pub viewport: Viewport,
    pub styles: GlobalStyles,
    pub scroll: f64,
    pub pending_edits: usize,
}

#[derive(Debug, Clone)]
pub struct PreviewHandle {
    requests: mpsc::UnboundedSender<PreviewRequest>,
    pointer: mpsc::UnboundedSender<PointerEvent>,
}

impl PreviewHandle {
    pub fn send(&self, request: PreviewRequest) -> Result<(), PreviewError> {
        self.requests
            .send(request)
            .map_err(|_| PreviewError::ActorStopped)
    }

    pub fn pointer(&self, event: PointerEvent) -> Result<(), PreviewError> {
        self.pointer
            .send(event)
            .map_err(|_| PreviewError::ActorStopped)
    }

    pub fn add_section(&self, section: Section, index: Option<usize>) -> Result<(), PreviewError> {
        self.send(PreviewRequest::AddSection { section, index })
    }

    pub fn reorder(&self, sections: Vec<Section>) -> Result<(), PreviewError> {
        self.send(PreviewRequest::Reorder(sections))
    }

    pub fn edit_inline(
        &self,
        section_id: SectionId,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), PreviewError> {
        self.send(PreviewRequest::EditInline {
            section_id,
            key: key.into(),
            value,
        })
    }

    pub async fn snapshot(&self) -> Result<PreviewSnapshot, PreviewError> {
        let (reply, rx) = oneshot::channel();
        self.send(PreviewRequest::Snapshot(reply))?;
        rx.await.map_err(|_| PreviewError::ActorStopped)
    }
}

pub struct PreviewActor {
    session: PreviewSession,
    outbound: PortSender,
    inbound: PortReceiver,
    requests: mpsc::UnboundedReceiver<PreviewRequest>,
    pointer: mpsc::UnboundedReceiver<PointerEvent>,
}

impl PreviewActor {
    pub fn new(session: PreviewSession, port: Port) -> (Self, PreviewHandle) {
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let (pointer_tx, pointer) = mpsc::unbounded_channel();
        let (outbound, inbound) = port.split();

        let actor = Self {
            session,
            outbound,
            inbound,
            requests,
            pointer,
        };
        let handle = PreviewHandle {
            requests: requests_tx,
            pointer: pointer_tx,
        };
        (actor, handle)
    }

    pub fn spawn(session: PreviewSession, port: Port) -> (PreviewHandle, JoinHandle<()>) {
        let (actor, handle) = Self::new(session, port);
        (handle, tokio::spawn(actor.run()))
    }

    /// Run until the editor disconnects or every handle is dropped
    pub async fn run(mut self) {
        tracing::info!(origin = %self.session.origin(), "preview session started");
        let mut pointer_open = true;

        loop {
            let deadline = self.session.settle_deadline();

            tokio::select! {
                raw = self.inbound.recv() => match raw {
                    Some(raw) => {
                        let out = self.session.handle_raw(&raw);
                        self.send_all(out);
                    }
                    None => {
                        tracing::info!("editor disconnected");
                        break;
                    }
                },
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request),
                    None => break,
                },
                event = self.pointer.recv(), if pointer_open => match event {
                    Some(event) => self.handle_pointer(event),
                    None => pointer_open = false,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.session.settle(Instant::now());
                }
            }
        }

        tracing::info!(revision = self.session.revision(), "preview session stopped");
    }

    fn handle_request(&mut self, request: PreviewRequest) {
        let out = match request {
            PreviewRequest::AddSection { section, index } => {
                self.session.add_section(section, index)
            }
            PreviewRequest::Reorder(sections) => self.session.reorder(sections),
            PreviewRequest::EditInline {
                section_id,
                key,
                value,
            } => {
                self.session.edit_inline(section_id, key, value);
                Vec::new()
            }
            PreviewRequest::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
                Vec::new()
            }
        };

        self.send_all(out);
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        let now = Instant::now();
        let out = match event {
            PointerEvent::Move(point) => {
                self.session.pointer_move(point, now);
                Vec::new()
            }
            PointerEvent::Leave => {
                self.session.pointer_leave(now);
                Vec::new()
            }
            PointerEvent::Click(point) => self.session.click(point, now),
            PointerEvent::Scroll(dy) => {
                self.session.scroll_by(dy);
                Vec::new()
            }
        };

        self.send_all(out);
    }

    fn snapshot(&self) -> PreviewSnapshot {
        let overlay = self.session.overlay();
        PreviewSnapshot {
            state: self.session.state().clone(),
            tree: self.session.tree().clone(),
            selection: overlay.selection().cloned(),
            hover: overlay.hover().cloned(),
            viewport: self.session.viewport(),
            styles: self.session.styles().clone(),
            scroll: self.session.layout().scroll_offset().y,
            pending_edits: self.session.pending_edits(),
        }
    }

    fn send_all(&self, envelopes: Vec<Envelope>) {
        for envelope in envelopes {
            if let Err(err) = self.outbound.send(&envelope) {
                tracing::warn!(%err, tag = envelope.message.tag(), "dropping outbound envelope");
            }
        }
    }
}
