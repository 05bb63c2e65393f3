//! # Editor Actor
//!
//! Runs an [`EditorSession`] on its own task. Three inputs are multiplexed:
//!
//! - raw envelopes from the preview port
//! - requests from the editor UI, through an [`EditorHandle`]
//! - settled save barriers, fed back from the task awaiting them
//!
//! A save never blocks the loop. The barrier is awaited on a side task, so
//! the inline edits the preview flushes (which arrive before its
//! `ACTION_COMPLETE`) are reduced first and included in the snapshot.

use crate::errors::EditorError;
use crate::session::EditorSession;
use crate::store::{SaveReport, SettingsStore};
use pagewright_bridge::{
    BarrierOutcome, Envelope, Port, PortReceiver, PortSender, RequestId, Viewport,
};
use pagewright_document::{
    Command, EditorState, GlobalStyles, SectionId, SectionType, Settings, StyleScope,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

type Reply<T> = oneshot::Sender<T>;

#[derive(Debug)]
pub enum EditorRequest {
    Dispatch(Command),
    AddFromCatalog {
        section_type: SectionType,
        index: Option<usize>,
    },
    Duplicate(SectionId),
    Select(Option<SectionId>),
    Hover(Option<SectionId>),
    ScrollTo(SectionId),
    SetViewport(Viewport),
    UpdateStyles(StyleScope, Settings),
    Save(Reply<Result<SaveReport, EditorError>>),
    Snapshot(Reply<EditorSnapshot>),
}

/// Point-in-time view of the editor, for the UI and tests
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub state: EditorState,
    pub selection: Option<SectionId>,
    pub viewport: Viewport,
    pub styles: GlobalStyles,
}

/// Cheap, cloneable way to talk to a running [`EditorActor`]
#[derive(Debug, Clone)]
pub struct EditorHandle {
    tx: mpsc::UnboundedSender<EditorRequest>,
}

impl EditorHandle {
    pub fn send(&self, request: EditorRequest) -> Result<(), EditorError> {
        self.tx.send(request).map_err(|_| EditorError::ActorStopped)
    }

    pub fn dispatch(&self, command: Command) -> Result<(), EditorError> {
        self.send(EditorRequest::Dispatch(command))
    }

    pub fn select(&self, section_id: Option<SectionId>) -> Result<(), EditorError> {
        self.send(EditorRequest::Select(section_id))
    }

    pub fn set_viewport(&self, viewport: Viewport) -> Result<(), EditorError> {
        self.send(EditorRequest::SetViewport(viewport))
    }

    pub fn update_styles(&self, scope: StyleScope, settings: Settings) -> Result<(), EditorError> {
        self.send(EditorRequest::UpdateStyles(scope, settings))
    }

    /// Flush the preview, then persist. Resolves once the store has been written.
    pub async fn save(&self) -> Result<SaveReport, EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(EditorRequest::Save(reply))?;
        rx.await.map_err(|_| EditorError::ActorStopped)?
    }

    pub async fn snapshot(&self) -> Result<EditorSnapshot, EditorError> {
        let (reply, rx) = oneshot::channel();
        self.send(EditorRequest::Snapshot(reply))?;
        rx.await.map_err(|_| EditorError::ActorStopped)
    }
}

struct FlushSettled {
    request_id: RequestId,
    outcome: BarrierOutcome,
    reply: Reply<Result<SaveReport, EditorError>>,
}

pub struct EditorActor {
    session: EditorSession,
    outbound: PortSender,
    inbound: PortReceiver,
    inbound_open: bool,
    store: Arc<dyn SettingsStore>,
    requests: mpsc::UnboundedReceiver<EditorRequest>,
    settled_tx: mpsc::UnboundedSender<FlushSettled>,
    settled_rx: mpsc::UnboundedReceiver<FlushSettled>,
}

impl EditorActor {
    pub fn new(
        session: EditorSession,
        port: Port,
        store: Arc<dyn SettingsStore>,
    ) -> (Self, EditorHandle) {
        let (tx, requests) = mpsc::unbounded_channel();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let (outbound, inbound) = port.split();

        let actor = Self {
            session,
            outbound,
            inbound,
            inbound_open: true,
            store,
            requests,
            settled_tx,
            settled_rx,
        };
        (actor, EditorHandle { tx })
    }

    pub fn spawn(
        session: EditorSession,
        port: Port,
        store: Arc<dyn SettingsStore>,
    ) -> (EditorHandle, JoinHandle<()>) {
        let (actor, handle) = Self::new(session, port, store);
        (handle, tokio::spawn(actor.run()))
    }

    /// Run until every [`EditorHandle`] is dropped
    pub async fn run(mut self) {
        tracing::info!(origin = %self.session.origin(), "editor session started");
        let hello = self.session.sync();
        self.send_all(hello);

        loop {
            tokio::select! {
                raw = self.inbound.recv(), if self.inbound_open => match raw {
                    Some(raw) => {
                        let out = self.session.handle_raw(&raw);
                        self.send_all(out);
                    }
                    None => {
                        tracing::info!("preview disconnected");
                        self.inbound_open = false;
                    }
                },
                request = self.requests.recv() => match request {
                    Some(request) => self.handle_request(request),
                    None => break,
                },
                Some(settled) = self.settled_rx.recv() => self.finish_save(settled),
            }
        }

        tracing::info!(revision = self.session.revision(), "editor session stopped");
    }

    fn handle_request(&mut self, request: EditorRequest) {
        let out = match request {
            EditorRequest::Dispatch(command) => self.session.dispatch(command),
            EditorRequest::AddFromCatalog {
                section_type,
                index,
            } => self.session.add_from_catalog(&section_type, index),
            EditorRequest::Duplicate(section_id) => self.session.duplicate(&section_id),
            EditorRequest::Select(section_id) => self.session.select(section_id),
            EditorRequest::Hover(section_id) => self.session.hover(section_id),
            EditorRequest::ScrollTo(section_id) => self.session.scroll_to(section_id),
            EditorRequest::SetViewport(viewport) => self.session.set_viewport(viewport),
            EditorRequest::UpdateStyles(scope, settings) => {
                self.session.update_styles(scope, settings)
            }
            EditorRequest::Save(reply) => {
                self.begin_save(reply);
                Vec::new()
            }
            EditorRequest::Snapshot(reply) => {
                let _ = reply.send(EditorSnapshot {
                    state: self.session.state().clone(),
                    selection: self.session.selection().cloned(),
                    viewport: self.session.viewport(),
                    styles: self.session.styles().clone(),
                });
                Vec::new()
            }
        };

        self.send_all(out);
    }

    fn begin_save(&mut self, reply: Reply<Result<SaveReport, EditorError>>) {
        let (envelope, completion) = self.session.request_flush();
        self.send_all(vec![envelope]);

        let settled = self.settled_tx.clone();
        tokio::spawn(async move {
            let request_id = completion.request_id();
            let outcome = completion.wait().await;
            let _ = settled.send(FlushSettled {
                request_id,
                outcome,
                reply,
            });
        });
    }

    fn finish_save(&mut self, settled: FlushSettled) {
        if settled.outcome == BarrierOutcome::TimedOut {
            self.session.cancel_flush(settled.request_id);
        }

        let result = self.persist(settled.outcome);
        if let Err(err) = &result {
            tracing::error!(%err, "save failed");
        }
        let _ = settled.reply.send(result);
    }

    fn persist(&self, flush: BarrierOutcome) -> Result<SaveReport, EditorError> {
        let snapshot = self.session.snapshot();
        self.store.save(&snapshot)?;
        let stylesheet = self.store.regenerate_stylesheet(&snapshot.styles)?;

        let report = SaveReport {
            flush,
            revision: self.session.revision(),
            sections: snapshot.sections.len(),
            stylesheet,
        };
        tracing::info!(
            flush = ?report.flush,
            revision = report.revision,
            sections = report.sections,
            "settings saved"
        );
        Ok(report)
    }

    fn send_all(&self, envelopes: Vec<Envelope>) {
        for envelope in envelopes {
            if let Err(err) = self.outbound.send(&envelope) {
                tracing::warn!(%err, tag = envelope.message.tag(), "dropping outbound envelope");
            }
        }
    }
}
